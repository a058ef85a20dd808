#![forbid(unsafe_code)]

//! Panel and group configuration.
//!
//! [`SwipeConfig`] is fixed at construction time: a panel copies it once and
//! a group hands the same copy to every panel it creates.
//!
//! # Loading
//!
//! With the `config` feature, a config can be parsed from TOML or JSON text.
//! Durations are written in milliseconds:
//!
//! ```toml
//! animation_duration_ms = 250
//! threshold_ratio = 0.3
//! easing = "ease_out_quad"
//! ```
//!
//! ```rust,ignore
//! let config = SwipeConfig::from_toml_str(text)?;
//! ```
//!
//! Missing fields take their defaults. Parsed configs are validated before
//! being returned.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use swipebox_core::{DEFAULT_FRAME_INTERVAL, Easing};
use thiserror::Error;

/// Default length of programmatic open/close transitions.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Default fraction of the reveal width that commits a drag.
pub const DEFAULT_THRESHOLD_RATIO: f32 = 0.25;

/// Construction-time settings shared by a panel or by every panel of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwipeConfig {
    /// Length of programmatic open/close interpolation (default: 200ms).
    #[cfg_attr(
        feature = "serde",
        serde(rename = "animation_duration_ms", with = "duration_ms")
    )]
    pub animation_duration: Duration,
    /// Fraction of the reveal width used as the open/close commit boundary
    /// (default: 0.25). Valid range is `(0, 1]`.
    pub threshold_ratio: f32,
    /// Curve applied to open/close transitions (default: ease-out).
    pub easing: Easing,
    /// Pacing between animation steps (default: 16ms).
    #[cfg_attr(
        feature = "serde",
        serde(rename = "frame_interval_ms", with = "duration_ms")
    )]
    pub frame_interval: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            animation_duration: DEFAULT_ANIMATION_DURATION,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            easing: Easing::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl SwipeConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from the two tunables, in the units callers usually
    /// have at hand.
    #[must_use]
    pub fn from_millis(animation_duration_ms: u64, threshold_ratio: f32) -> Self {
        Self {
            animation_duration: Duration::from_millis(animation_duration_ms),
            threshold_ratio,
            ..Self::default()
        }
    }

    /// Set the transition duration (builder pattern).
    #[must_use]
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Set the commit threshold ratio (builder pattern).
    #[must_use]
    pub fn with_threshold_ratio(mut self, ratio: f32) -> Self {
        self.threshold_ratio = ratio;
        self
    }

    /// Set the transition easing (builder pattern).
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the animation step pacing (builder pattern).
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Check every field is within its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation_duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if !(self.threshold_ratio > 0.0 && self.threshold_ratio <= 1.0) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold_ratio));
        }
        if self.frame_interval.is_zero() {
            return Err(ConfigError::ZeroFrameInterval);
        }
        Ok(())
    }

    /// Copy with out-of-range values replaced, so panels never need to fail.
    ///
    /// A non-positive or NaN ratio falls back to the default, ratios above 1
    /// clamp to 1, and a zero frame interval falls back to the default. A
    /// zero animation duration is kept and means "jump instantly".
    #[must_use]
    pub fn sanitized(self) -> Self {
        let threshold_ratio = if self.threshold_ratio > 1.0 {
            1.0
        } else if self.threshold_ratio > 0.0 {
            self.threshold_ratio
        } else {
            DEFAULT_THRESHOLD_RATIO
        };
        let frame_interval = if self.frame_interval.is_zero() {
            DEFAULT_FRAME_INTERVAL
        } else {
            self.frame_interval
        };
        Self {
            threshold_ratio,
            frame_interval,
            ..self
        }
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors from validating or loading a [`SwipeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `animation_duration` was zero.
    #[error("animation duration must be positive")]
    ZeroDuration,
    /// `threshold_ratio` was outside `(0, 1]`.
    #[error("threshold ratio must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f32),
    /// `frame_interval` was zero.
    #[error("frame interval must be positive")]
    ZeroFrameInterval,
    /// TOML parse failure.
    #[cfg(feature = "config")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse failure.
    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
