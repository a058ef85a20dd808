#![forbid(unsafe_code)]

//! Time-based tween between two scalar values.
//!
//! A [`Tween`] is pure: it holds no clock. Callers sample it with the time
//! elapsed since the run started, which keeps it usable from both the async
//! [`AnimationController`](crate::AnimationController) and plain tick loops.
//!
//! # Invariants
//!
//! 1. `sample(elapsed)` returns exactly `to` once `elapsed >= duration`.
//! 2. Samples always lie between `from` and `to` (inclusive), whatever the
//!    easing returns.
//! 3. A zero duration is complete at `elapsed == 0`.

use std::time::Duration;

use crate::easing::Easing;

/// Interpolation of one scalar from `from` to `to` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    /// Create a tween with the default easing ([`Easing::EaseOut`]).
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            easing: Easing::default(),
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Start value.
    #[inline]
    #[must_use]
    pub fn start(&self) -> f32 {
        self.from
    }

    /// Target value.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f32 {
        self.to
    }

    /// Total duration.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Easing curve in use.
    #[inline]
    #[must_use]
    pub fn easing_curve(&self) -> Easing {
        self.easing
    }

    /// Linear time progress in `[0.0, 1.0]`.
    #[must_use]
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Whether the tween has reached its target at `elapsed`.
    #[inline]
    #[must_use]
    pub fn is_complete_at(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Value at `elapsed` since the start of the run.
    #[must_use]
    pub fn sample(&self, elapsed: Duration) -> f32 {
        if self.is_complete_at(elapsed) {
            return self.to;
        }
        let eased = self.easing.apply(self.progress_at(elapsed));
        if eased.is_nan() {
            return self.from;
        }
        let value = self.from + (self.to - self.from) * eased;
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        value.clamp(lo, hi)
    }
}
