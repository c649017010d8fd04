//! JSON-RPC 2.0 bridge between the hit test and an embedding web page.
//!
//! When the engine runs inside an iframe, hit test events are posted to the
//! parent window as notifications and the parent can query or retune the hit
//! test with requests.
//!
//! ```text
//! Parent window  <──postMessage──>  Bevy (iframe)
//!      │                                 │
//!      │ <── hit_test_over ──────────────┤  every active frame with a query
//!      │ <── hit_test_click / dblclick ──┤
//!      │ <── hit_test_progress / ready ──┤  index build
//!      │ <── hit_test_failed ────────────┤
//!      ├── get_hit_test_pointer ───────> │
//!      ├── set_hit_test_settings ──────> │
//! ```
//!
//! Notification params are the `HitTestEvent::to_json` payloads.
//! Error codes follow JSON-RPC 2.0: `-32601` unknown method, `-32602` invalid
//! params, `-32603` internal error.

/// Notification forwarding and request handling.
pub mod web_rpc;

pub use web_rpc::{HitTestRpcPlugin, RpcNotification, notification_for};
