#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! Animations produce normalized `f32` progress values (0.0–1.0) and are
//! advanced explicitly with [`Animation::tick`]; nothing here reads a clock.
//! The panel engine drives a [`Fade`] per running reset or layout entrance
//! and interpolates sizes with its eased progress.
//!
//! # Invariants
//!
//! 1. `value()` is always clamped to [0.0, 1.0].
//! 2. A zero duration is clamped to 1ns, so the first non-zero tick completes
//!    the animation and `value()` never divides by zero.
//! 3. `tick()` after completion keeps `value()` at 1.0.

use std::time::Duration;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// jQuery's default "swing" easing.
#[inline]
pub fn swing(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    0.5 - (t * std::f32::consts::PI).cos() / 2.0
}

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;
}

/// Linear progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Elapsed time is tracked as a [`Duration`] so repeated ticks do not drift.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.raw_progress())
    }
}
