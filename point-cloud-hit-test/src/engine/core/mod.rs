//! Application wiring for hit testing.
//!
//! `HitTestPlugin` is what host applications add; `app_setup` builds the
//! standalone viewer on top of it for both native and WASM targets.

/// Standalone viewer app: window, camera, demo cloud and pick feedback.
pub mod app_setup;

/// Resources and system ordering for hit testing inside a Bevy app.
pub mod plugin;
