#![forbid(unsafe_code)]

//! Monotonic clocks.
//!
//! Engines never read time themselves; they take `now` as a [`Duration`]
//! since an arbitrary epoch. Hosts either drive a [`DeterministicClock`]
//! explicitly (tests, replay) or read a [`SystemClock`].

use std::time::Duration;

use web_time::Instant;

/// Source of monotonic time.
pub trait MonotonicClock {
    /// Time elapsed since the clock's epoch.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl MonotonicClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Clock backed by the platform's monotonic timer (`performance.now()` on wasm).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.epoch.elapsed()
    }
}
