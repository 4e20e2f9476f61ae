#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! Every tunable of the engine lives in one [`EngineConfig`] that can be
//! built in code or, with the `engine-config` feature, loaded from TOML or
//! JSON:
//!
//! ```toml
//! # fscroll.toml
//! duration_secs = 1.2
//! easing = "expo_out"
//! wheel_gain = 1.0
//! touch_gain = 2.0
//! gesture = "vertical"
//! resize_debounce_ms = 150
//! ```
//!
//! # Defaults
//!
//! The defaults reproduce the behavior pages were tuned against: a 1.2s
//! exponential ease-out, unit gains, 1s scrub on pinned tracks, and a 150ms
//! trailing resize debounce. The debounce is an empirical value, not an
//! invariant, so it is configurable like everything else.

#[cfg(feature = "engine-config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "engine-config")]
use serde::{Deserialize, Serialize};

use fscroll_core::animation::{EASING_NAMES, easing_by_name, expo_out};
use fscroll_core::geometry::Axis;

use crate::driver::DriverConfig;

/// Which physical gesture axis drives the virtual scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "engine-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "engine-config", serde(rename_all = "snake_case"))]
pub enum GestureOrientation {
    /// Vertical wheel/touch movement scrolls (the usual case, also for
    /// horizontal tracks).
    #[default]
    Vertical,
    /// Horizontal wheel/touch movement scrolls.
    Horizontal,
    /// Whichever component of the gesture is larger.
    Both,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "engine-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "engine-config", serde(default))]
pub struct EngineConfig {
    /// Duration of one eased scroll tween, in seconds.
    pub duration_secs: f64,
    /// Easing name (see [`EASING_NAMES`]).
    pub easing: String,
    /// Multiplier applied to wheel deltas.
    pub wheel_gain: f64,
    /// Multiplier applied to touch deltas.
    pub touch_gain: f64,
    /// Gesture axis mapping.
    pub gesture: GestureOrientation,
    /// Pixels per line for line-mode wheel deltas.
    pub line_height: f64,
    /// Default scrub lag (seconds) for pinned tracks without their own.
    pub track_scrub: f64,
    /// Trailing debounce for resize re-measurement, in milliseconds.
    pub resize_debounce_ms: u64,
    /// Frame delta assumed for the first frame after setup, in milliseconds.
    pub fallback_frame_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            duration_secs: 1.2,
            easing: "expo_out".to_string(),
            wheel_gain: 1.0,
            touch_gain: 1.0,
            gesture: GestureOrientation::Vertical,
            line_height: 16.0,
            track_scrub: 1.0,
            resize_debounce_ms: 150,
            fallback_frame_ms: 1000.0 / 60.0,
        }
    }
}

/// Longest tween duration accepted from configuration.
pub const MAX_DURATION_SECS: f64 = 60.0;

const MAX_DURATION: Duration = Duration::from_secs(60);

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl EngineConfig {
    /// Load from a TOML string.
    #[cfg(feature = "engine-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "engine-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "engine-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !positive(self.duration_secs) || self.duration_secs > MAX_DURATION_SECS {
            errors.push(format!(
                "duration_secs must be in (0, {MAX_DURATION_SECS}], got {}",
                self.duration_secs
            ));
        }
        if easing_by_name(&self.easing).is_none() {
            errors.push(format!(
                "easing must be one of {EASING_NAMES:?}, got {:?}",
                self.easing
            ));
        }
        if !positive(self.wheel_gain) {
            errors.push(format!("wheel_gain must be > 0, got {}", self.wheel_gain));
        }
        if !positive(self.touch_gain) {
            errors.push(format!("touch_gain must be > 0, got {}", self.touch_gain));
        }
        if !positive(self.line_height) {
            errors.push(format!("line_height must be > 0, got {}", self.line_height));
        }
        if !self.track_scrub.is_finite() || self.track_scrub < 0.0 {
            errors.push(format!(
                "track_scrub must be >= 0, got {}",
                self.track_scrub
            ));
        }
        if !positive(self.fallback_frame_ms) {
            errors.push(format!(
                "fallback_frame_ms must be > 0, got {}",
                self.fallback_frame_ms
            ));
        }

        errors
    }

    /// Reject the config if [`validate`](Self::validate) reports anything.
    ///
    /// Use this for strict loading (`EngineConfig::from_toml_file(p)?.validated()?`)
    /// where a typo should fail rather than be repaired by [`sanitized`](Self::sanitized).
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Replace every invalid field with its default (an overlong duration is
    /// clamped instead), logging each repair.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for problem in self.validate() {
            tracing::warn!(%problem, "engine config value replaced with default");
        }
        if !positive(self.duration_secs) {
            self.duration_secs = defaults.duration_secs;
        } else if self.duration_secs > MAX_DURATION_SECS {
            self.duration_secs = MAX_DURATION_SECS;
        }
        if easing_by_name(&self.easing).is_none() {
            self.easing = defaults.easing;
        }
        if !positive(self.wheel_gain) {
            self.wheel_gain = defaults.wheel_gain;
        }
        if !positive(self.touch_gain) {
            self.touch_gain = defaults.touch_gain;
        }
        if !positive(self.line_height) {
            self.line_height = defaults.line_height;
        }
        if !self.track_scrub.is_finite() || self.track_scrub < 0.0 {
            self.track_scrub = defaults.track_scrub;
        }
        if !positive(self.fallback_frame_ms) {
            self.fallback_frame_ms = defaults.fallback_frame_ms;
        }
        self
    }

    /// Driver settings derived from this config.
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            duration: Duration::try_from_secs_f64(if positive(self.duration_secs) {
                self.duration_secs
            } else {
                Self::default().duration_secs
            })
            .unwrap_or(MAX_DURATION),
            easing: easing_by_name(&self.easing).unwrap_or(expo_out),
            wheel_gain: self.wheel_gain,
            touch_gain: self.touch_gain,
            axis: Axis::Vertical,
        }
    }

    /// Resize debounce as a [`Duration`].
    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Frame delta assumed for the first frame as a [`Duration`].
    #[must_use]
    pub fn fallback_frame_delta(&self) -> Duration {
        let ms = if positive(self.fallback_frame_ms) {
            self.fallback_frame_ms
        } else {
            Self::default().fallback_frame_ms
        };
        Duration::from_micros((ms * 1000.0).round() as u64)
    }

    /// Set the tween duration (builder pattern).
    #[must_use]
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Set the easing by name (builder pattern).
    #[must_use]
    pub fn with_easing(mut self, name: &str) -> Self {
        self.easing = name.to_string();
        self
    }

    /// Set the gesture orientation (builder pattern).
    #[must_use]
    pub fn with_gesture(mut self, gesture: GestureOrientation) -> Self {
        self.gesture = gesture;
        self
    }

    /// Set the default track scrub (builder pattern).
    #[must_use]
    pub fn with_track_scrub(mut self, scrub: f64) -> Self {
        self.track_scrub = scrub;
        self
    }

    /// Set the resize debounce (builder pattern).
    #[must_use]
    pub fn with_resize_debounce_ms(mut self, ms: u64) -> Self {
        self.resize_debounce_ms = ms;
        self
    }
}

/// Errors from loading an [`EngineConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "engine-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "engine-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "engine-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "engine-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
