use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::events::{BusEvent, HitTestEvent, HitTestEventKind};
use crate::engine::hit_test::HitTest;
use crate::engine::settings::HitTestSettings;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl RpcNotification {
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Messages waiting to be posted to the parent window.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Hit test notifications captured by bus listeners, drained once per frame.
#[derive(Resource, Default, Clone)]
pub struct HitTestOutbox(Arc<Mutex<Vec<RpcNotification>>>);

impl HitTestOutbox {
    fn push(&self, notification: RpcNotification) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(notification);
        }
    }

    fn take(&self) -> Vec<RpcNotification> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Mirrors hit test events to an embedding page as JSON-RPC notifications and
/// answers pointer and settings requests from it.
///
/// Requires `HitTestPlugin`. Outside wasm32 messages are dropped.
pub struct HitTestRpcPlugin;

impl Plugin for HitTestRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<HitTestOutbox>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(Startup, subscribe_hit_test_notifications)
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    collect_hit_test_notifications,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

/// Wire form of a hit test event.
pub fn notification_for(event: &HitTestEvent) -> RpcNotification {
    RpcNotification::new(event.kind().notification_method(), event.to_json())
}

fn subscribe_hit_test_notifications(
    hit_test: Option<ResMut<HitTest>>,
    outbox: Res<HitTestOutbox>,
) {
    let Some(mut hit_test) = hit_test else {
        warn!("Hit test RPC bridge has no hit test to listen to");
        return;
    };
    for kind in HitTestEventKind::ALL {
        let outbox = outbox.clone();
        hit_test.on(kind, move |event| outbox.push(notification_for(event)));
    }
}

fn collect_hit_test_notifications(
    outbox: Res<HitTestOutbox>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    rpc_interface.outgoing_notifications.extend(outbox.take());
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Some(message_str) = event.data().as_string() {
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Ownership moves to JS; the listener lives as long as the page.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(Arc<Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    hit_test: Option<ResMut<HitTest>>,
    settings: Option<ResMut<HitTestSettings>>,
) {
    let (Some(mut hit_test), Some(mut settings)) = (hit_test, settings) else {
        events.clear();
        return;
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(&request, &mut hit_test, &mut settings) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => warn!("Ignoring malformed RPC message: {}", parse_error),
        }
    }
}

/// Answer one request. Notifications (no id) get no response.
fn handle_rpc_request(
    request: &RpcRequest,
    hit_test: &mut HitTest,
    settings: &mut HitTestSettings,
) -> Option<RpcResponse> {
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "get_hit_test_pointer" => handle_get_pointer(hit_test),
        "set_hit_test_settings" => handle_set_settings(&request.params, hit_test, settings),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_get_pointer(hit_test: &HitTest) -> Result<serde_json::Value, RpcError> {
    let pointer = hit_test.pointer().snapshot();
    Ok(HitTestEvent::Over(pointer).to_json())
}

fn handle_set_settings(
    params: &serde_json::Value,
    hit_test: &mut HitTest,
    settings: &mut HitTestSettings,
) -> Result<serde_json::Value, RpcError> {
    let requested = serde_json::from_value::<HitTestSettings>(params.clone())
        .map_err(|e| RpcError::invalid_params(&format!("Invalid settings: {e}")))?;

    hit_test
        .set_settings(requested.clone())
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;
    *settings = requested;
    info!("Hit test settings updated over RPC");

    serde_json::to_value(&*settings).map_err(|e| RpcError::internal_error(&e.to_string()))
}

fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Notifications go out before responses.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
