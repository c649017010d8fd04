/// Quiescence window after the last pointer motion before raycasting is suspended.
pub const INTERACTION_QUIESCENCE_MS: u64 = 100;

/// Delay before a single click is reported, leaving room for a second press.
pub const CLICK_DISAMBIGUATION_MS: u64 = 300;

/// Touch clicks are reported on the next scheduling turn.
pub const TOUCH_CLICK_DELAY_MS: u64 = 0;
