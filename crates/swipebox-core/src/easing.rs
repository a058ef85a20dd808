#![forbid(unsafe_code)]

//! Easing curves for panel transitions.
//!
//! An easing maps linear time progress `t` in `[0.0, 1.0]` to eased progress
//! in the same range. Presets never overshoot, so a tween driven by any
//! preset stays between its endpoints. [`Easing::Custom`] accepts any
//! `fn(f32) -> f32`; its output is clamped by [`Tween`](crate::Tween).
//!
//! # Invariants
//!
//! 1. Every preset maps `0.0 -> 0.0` and `1.0 -> 1.0`.
//! 2. Every preset is monotonically non-decreasing on `[0.0, 1.0]`.
//! 3. Inputs outside `[0.0, 1.0]` (including NaN) are clamped first.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain easing function pointer.
pub type EasingFn = fn(f32) -> f32;

/// Easing curve applied to tween progress.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Cubic acceleration: `t³`.
    EaseIn,
    /// Cubic deceleration: `1 - (1-t)³`. Standard curve for settling panels.
    #[default]
    EaseOut,
    /// Cubic S-curve.
    EaseInOut,
    /// Quadratic deceleration: `1 - (1-t)²`. Subtler than [`Easing::EaseOut`].
    EaseOutQuad,
    /// Caller-supplied curve.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(EasingFn),
}

impl Easing {
    /// Apply the curve to linear progress `t`.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::EaseOutQuad => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::Custom(f) => f(t),
        }
    }

    /// Whether this is one of the built-in presets.
    #[inline]
    #[must_use]
    pub fn is_preset(self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl PartialEq for Easing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Self::Custom(_), _) | (_, Self::Custom(_)) => false,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl From<EasingFn> for Easing {
    fn from(f: EasingFn) -> Self {
        Self::Custom(f)
    }
}
