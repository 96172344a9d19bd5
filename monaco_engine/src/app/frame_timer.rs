/// FrameTimer - wall-clock delta time between frames

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    start: Instant,
    last: Instant,
}

impl Default for FrameTimer {
    fn default() -> Self {
        let now = Instant::now();
        Self { start: now, last: now }
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick (or since creation)
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta.as_secs_f32()
    }

    /// Time since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
