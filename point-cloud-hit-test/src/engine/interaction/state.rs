use std::sync::Arc;
use std::time::Duration;

use bevy::input::mouse::MouseButton;
use bevy::math::{Ray3d, Vec2};
use constants::interaction::{
    CLICK_DISAMBIGUATION_MS, INTERACTION_QUIESCENCE_MS, TOUCH_CLICK_DELAY_MS,
};

use super::timers::{Scheduler, TimerHandle, TimerKind, VirtualScheduler};
use crate::engine::events::PointerSnapshot;

/// Whether raycasting runs this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionPhase {
    /// No pointer motion within the quiescence window.
    #[default]
    Idle,
    Active,
}

/// Click notifications produced by input or expiring timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSignal {
    Click,
    DoubleClick,
}

/// Last known pointer position and the latest query result under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    /// Normalized device coordinates, `[-1, 1]` with +y up.
    pub ndc: Vec2,
    /// Logical pixels from the top-left of the viewport.
    pub screen: Vec2,
    pub down: bool,
    pub indexes: Option<Arc<[u32]>>,
    pub ray: Option<Ray3d>,
}

impl PointerState {
    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            down: self.down,
            x: self.screen.x,
            y: self.screen.y,
            indexes: self.indexes.clone(),
            ray: self.ray,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionTimings {
    pub quiescence: Duration,
    pub click_window: Duration,
    pub touch_click_delay: Duration,
}

impl Default for InteractionTimings {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(INTERACTION_QUIESCENCE_MS),
            click_window: Duration::from_millis(CLICK_DISAMBIGUATION_MS),
            touch_click_delay: Duration::from_millis(TOUCH_CLICK_DELAY_MS),
        }
    }
}

/// Pointer, button and idle tracking for one viewport.
///
/// Raycasting is only worth doing shortly after the pointer moved, so every
/// motion activates the state and (re)arms a quiescence timer that drops it
/// back to `Idle`. A primary release without a drag arms a pending click; a
/// press while that is pending turns it into a double click instead.
pub struct InteractionState {
    phase: InteractionPhase,
    pointer: PointerState,
    dragging: bool,
    viewport: Vec2,
    timings: InteractionTimings,
    scheduler: Box<dyn Scheduler>,
    reset_timer: Option<TimerHandle>,
    pending_click: Option<TimerHandle>,
}

impl std::fmt::Debug for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionState")
            .field("phase", &self.phase)
            .field("pointer", &self.pointer)
            .field("dragging", &self.dragging)
            .field("viewport", &self.viewport)
            .field("pending_timers", &self.scheduler.pending())
            .finish()
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(InteractionTimings::default(), Box::new(VirtualScheduler::new()))
    }
}

impl InteractionState {
    pub fn new(timings: InteractionTimings, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            phase: InteractionPhase::Idle,
            pointer: PointerState::default(),
            dragging: false,
            viewport: Vec2::ZERO,
            timings,
            scheduler,
            reset_timer: None,
            pending_click: None,
        }
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == InteractionPhase::Active
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Store the result of the latest frame query.
    pub fn record_hits(&mut self, indexes: Arc<[u32]>, ray: Ray3d) {
        self.pointer.indexes = Some(indexes);
        self.pointer.ray = Some(ray);
    }

    pub fn set_timings(&mut self, timings: InteractionTimings) {
        self.timings = timings;
    }

    /// Viewport size in logical pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(0.0), height.max(0.0));
        self.pointer.ndc = self.normalize(self.pointer.screen);
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        if self.pointer.down {
            self.dragging = true;
        }
        self.set_position(position);
    }

    /// A press while a click is pending reports a double click right away.
    pub fn pointer_pressed(&mut self, button: MouseButton) -> Option<PointerSignal> {
        if button != MouseButton::Left {
            return None;
        }
        self.pointer.down = true;
        self.dragging = false;

        let pending = self.pending_click.take()?;
        self.scheduler.cancel(pending);
        Some(PointerSignal::DoubleClick)
    }

    pub fn pointer_released(&mut self, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        self.pointer.down = false;
        if self.dragging {
            return;
        }
        if let Some(previous) = self.pending_click.take() {
            self.scheduler.cancel(previous);
        }
        self.pending_click = Some(
            self.scheduler
                .schedule_after(self.timings.click_window, TimerKind::PendingClick),
        );
    }

    /// Only single-finger touches move the pointer.
    pub fn touch_started(&mut self, touches: &[Vec2]) {
        if let [touch] = touches {
            self.set_position(*touch);
        }
    }

    /// `remaining` holds the touches still on the surface. A click is reported
    /// on the next timer advance for every touch end.
    pub fn touch_ended(&mut self, remaining: &[Vec2]) {
        if let [touch] = remaining {
            self.set_position(*touch);
        }
        self.scheduler
            .schedule_after(self.timings.touch_click_delay, TimerKind::TouchClick);
    }

    /// Advance the timer clock and apply every expiry, in deadline order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<PointerSignal> {
        self.scheduler
            .advance(elapsed)
            .into_iter()
            .filter_map(|(handle, kind)| self.on_timer(handle, kind))
            .collect()
    }

    fn on_timer(&mut self, handle: TimerHandle, kind: TimerKind) -> Option<PointerSignal> {
        match kind {
            TimerKind::InteractionReset => {
                if self.reset_timer == Some(handle) {
                    self.reset_timer = None;
                    self.phase = InteractionPhase::Idle;
                }
                None
            }
            TimerKind::PendingClick => {
                if self.pending_click != Some(handle) {
                    return None;
                }
                self.pending_click = None;
                Some(PointerSignal::Click)
            }
            TimerKind::TouchClick => Some(PointerSignal::Click),
        }
    }

    /// Drop every scheduled timer; nothing fires afterwards.
    pub fn clear_timers(&mut self) {
        self.scheduler.cancel_all();
        self.reset_timer = None;
        self.pending_click = None;
    }

    pub fn has_pending_click(&self) -> bool {
        self.pending_click.is_some()
    }

    fn set_position(&mut self, position: Vec2) {
        self.pointer.screen = position;
        self.pointer.ndc = self.normalize(position);
        self.phase = InteractionPhase::Active;

        if let Some(previous) = self.reset_timer.take() {
            self.scheduler.cancel(previous);
        }
        self.reset_timer = Some(
            self.scheduler
                .schedule_after(self.timings.quiescence, TimerKind::InteractionReset),
        );
    }

    fn normalize(&self, position: Vec2) -> Vec2 {
        let axis = |value: f32, extent: f32| {
            if extent > 0.0 { value / extent * 2.0 - 1.0 } else { 0.0 }
        };
        Vec2::new(
            axis(position.x, self.viewport.x),
            -axis(position.y, self.viewport.y),
        )
    }
}
