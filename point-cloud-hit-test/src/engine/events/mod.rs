//! Publish/subscribe for hit test notifications.

/// Generic kind-routed event bus.
pub mod bus;

/// Hit test event payloads and kinds.
pub mod hit_test_events;

pub use bus::{BusEvent, EventBus, Listener, ListenerId};
pub use hit_test_events::{HitTestEvent, HitTestEventKind, PointerSnapshot};
