//! Pointer tracking, idle gating and click disambiguation.

pub mod state;

/// Timer capability and the deterministic clock behind it.
pub mod timers;

pub use state::{InteractionPhase, InteractionState, InteractionTimings, PointerSignal, PointerState};
pub use timers::{Scheduler, TimerHandle, TimerKind, VirtualScheduler};
