use std::collections::BTreeMap;
use std::time::Duration;

/// What a timer means when it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Quiescence window elapsed: stop raycasting until the pointer moves.
    InteractionReset,
    /// No second press arrived: report the single click.
    PendingClick,
    /// Touch release: report a click on the next turn.
    TouchClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Schedule-after / cancel capability driving the interaction timers.
pub trait Scheduler: Send + Sync {
    fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle;

    /// Returns false when the timer already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Move time forward and return the timers that expired, earliest first.
    /// A timer expires once the clock reaches its deadline.
    fn advance(&mut self, elapsed: Duration) -> Vec<(TimerHandle, TimerKind)>;

    fn cancel_all(&mut self);

    fn pending(&self) -> usize;
}

/// Deterministic clock that only moves when advanced.
///
/// Hosts advance it by frame delta; tests advance it by exact amounts.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    next_handle: u64,
    /// Keyed by (deadline, handle) so equal deadlines fire in scheduling order.
    timers: BTreeMap<(Duration, TimerHandle), TimerKind>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_after(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.insert((self.now + delay, handle), kind);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|(_, h), _| *h != handle);
        self.timers.len() != before
    }

    fn advance(&mut self, elapsed: Duration) -> Vec<(TimerHandle, TimerKind)> {
        self.now += elapsed;
        let mut expired = Vec::new();
        while let Some(entry) = self.timers.first_entry() {
            let (deadline, handle) = *entry.key();
            if deadline > self.now {
                break;
            }
            expired.push((handle, entry.remove()));
        }
        expired
    }

    fn cancel_all(&mut self) {
        self.timers.clear();
    }

    fn pending(&self) -> usize {
        self.timers.len()
    }
}
