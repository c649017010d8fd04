//! Runtime systems feeding Bevy input into the hit test.

/// Window size, pointer, touch, timer and camera motion forwarding plus the
/// per-frame hit test update.
pub mod hit_test_input;
