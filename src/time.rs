use std::time::{Duration, Instant};

/// Upper bound on a single tick, in seconds.
pub const DEFAULT_MAX_DELTA_SECONDS: f32 = 0.1;

pub struct Time {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::from_secs_f32(0.0) }
    }
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }
}

pub fn clamp_delta(raw: f32, max_delta: f32) -> f32 {
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, max_delta.max(0.0))
}
