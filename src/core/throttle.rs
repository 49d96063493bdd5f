/// Leading-edge rate limiter.
///
/// The first call passes immediately; calls arriving before `interval_ms`
/// has elapsed since the last accepted call are dropped (never queued).
#[derive(Clone, Debug)]
pub struct Throttle {
    interval_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as f64,
            last_accepted_ms: None,
        }
    }

    /// Returns true when a call at `now_ms` should run.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_accepted_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_accepted_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}
