#![forbid(unsafe_code)]

//! Auto-update debounce.
//!
//! Every edit calls [`AutoUpdate::trigger`], which restarts the quiet window.
//! [`AutoUpdate::poll`] fires once when the window has elapsed without a
//! further trigger; only the last edit in a burst sends an update.

use std::time::Duration;

/// Default quiet window before an auto-update fires.
pub const DEFAULT_AUTO_UPDATE_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoUpdate {
    delay: Duration,
    deadline: Option<Duration>,
    enabled: bool,
}

impl Default for AutoUpdate {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_UPDATE_DEBOUNCE)
    }
}

impl AutoUpdate {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn auto-update on or off. Turning it off drops a pending fire.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.deadline = None;
        }
    }

    /// Restart the quiet window at `now`.
    pub fn trigger(&mut self, now: Duration) {
        if self.enabled {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Returns `true` exactly once per burst, when its window has elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
