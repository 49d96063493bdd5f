use super::tier::IdleState;

/// DOM event types that count as user activity. All are registered passive.
pub const ACTIVITY_EVENTS: [&str; 6] = [
    "pointermove",
    "pointerdown",
    "keydown",
    "touchstart",
    "scroll",
    "wheel",
];

/// Tracks time since the last user input.
#[derive(Clone, Debug)]
pub struct IdleTracker {
    last_activity_ms: f64,
}

impl IdleTracker {
    pub fn new(now_ms: f64) -> Self {
        Self {
            last_activity_ms: now_ms,
        }
    }

    /// Record an input event. Returns the idle state that preceded it so the
    /// caller can decide whether a wake-up is worth reporting.
    pub fn record_activity(&mut self, now_ms: f64) -> IdleState {
        let before = self.state(now_ms);
        if now_ms > self.last_activity_ms {
            self.last_activity_ms = now_ms;
        }
        before
    }

    /// Monotonic between activity events; a clock that steps backwards
    /// reads as zero idle time rather than wrapping.
    pub fn state(&self, now_ms: f64) -> IdleState {
        let elapsed = (now_ms - self.last_activity_ms).max(0.0);
        IdleState {
            ms_since_last_activity: elapsed as u64,
        }
    }
}
