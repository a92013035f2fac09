#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

use crate::driver::Clock;

/// Monotonic wall clock started at construction.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start_time: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Clock for Timer {
    fn elapsed_seconds(&mut self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}
