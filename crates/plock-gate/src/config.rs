#![forbid(unsafe_code)]

//! Policy-as-data configuration for the lock gate.
//!
//! Captures every tunable of the gate (grid geometry, recognizer thresholds,
//! the reference pattern, attempt limits) as a single [`GateConfig`] that can
//! be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # plock-gate.toml
//! [layout]
//! surface_width = 390.0
//!
//! [recognizer]
//! detection_ratio = 0.9
//!
//! [unlock]
//! pattern = "0-1-2-5-8"
//! role = "elder"
//!
//! [attempts]
//! max_attempts = 3
//! lockout_secs = 30
//! ```
//!
//! ```rust,ignore
//! let config = GateConfig::load("plock-gate.toml")?;
//! let gate = LockGate::from_config(&config)?;
//! ```
//!
//! # Defaults
//!
//! Every field has a default, so an empty file yields the stock gate: a
//! 280px grid, radius at 95% of a cell, four-target minimum, the L-shaped
//! elder pattern, and three attempts before a 30 second lockout.

use std::path::Path;

use plock_core::gesture::{DEFAULT_DETECTION_RATIO, DEFAULT_FEEDBACK_DELAY, DEFAULT_MINIMUM_LENGTH};
use plock_core::{GridLayout, Pattern, RecognizerConfig, TARGET_COUNT};
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::attempts::{AttemptPolicy, DEFAULT_LOCKOUT, DEFAULT_MAX_ATTEMPTS};
use crate::error::{GateError, Result};
use crate::gate::Role;

/// Smallest detection radius (as a fraction of the cell edge) that is
/// reliable under finger input.
pub const MIN_DETECTION_RATIO: f32 = 0.70;

/// Largest detection radius (as a fraction of the cell edge).
pub const MAX_DETECTION_RATIO: f32 = 0.95;

/// Longest timed lockout accepted from config (one day).
pub const MAX_LOCKOUT_SECS: u64 = 86_400;

/// Longest post-gesture feedback delay accepted from config.
pub const MAX_FEEDBACK_DELAY_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Top-level GateConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a lock gate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Grid surface geometry.
    pub layout: GridLayout,

    /// Recognizer thresholds.
    pub recognizer: RecognizerPolicyConfig,

    /// What unlocks the gate and what it grants.
    pub unlock: UnlockPolicyConfig,

    /// Failed-attempt limits.
    pub attempts: AttemptPolicyConfig,
}

impl GateConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|err| GateError::io(path, err))?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|err| GateError::io(path, err))?;
        Self::from_json_str(&content)
    }

    /// Load a file (JSON if the extension is `.json`, TOML otherwise) and
    /// validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// Return `self` if valid, otherwise the collected validation errors.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(GateError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.layout.surface_width > 2.0 * self.layout.padding) {
            errors.push(format!(
                "layout.surface_width ({}) must exceed twice layout.padding ({})",
                self.layout.surface_width, self.layout.padding
            ));
        }
        if !(self.layout.max_grid_width > 0.0) {
            errors.push(format!(
                "layout.max_grid_width must be > 0, got {}",
                self.layout.max_grid_width
            ));
        }

        let ratio = self.recognizer.detection_ratio;
        if !(MIN_DETECTION_RATIO..=MAX_DETECTION_RATIO).contains(&ratio) {
            errors.push(format!(
                "recognizer.detection_ratio must be in [{MIN_DETECTION_RATIO}, {MAX_DETECTION_RATIO}], got {ratio}"
            ));
        }

        let minimum = self.recognizer.minimum_length;
        if minimum == 0 || minimum > TARGET_COUNT {
            errors.push(format!(
                "recognizer.minimum_length must be in 1..={TARGET_COUNT}, got {minimum}"
            ));
        }

        if self.unlock.pattern.len() < minimum {
            errors.push(format!(
                "unlock.pattern has {} targets but recognizer.minimum_length is {minimum}; it could never be entered",
                self.unlock.pattern.len()
            ));
        }

        if self.attempts.max_attempts == 0 {
            errors.push("attempts.max_attempts must be > 0".into());
        }
        if self.attempts.lockout_secs > MAX_LOCKOUT_SECS {
            errors.push(format!(
                "attempts.lockout_secs must be <= {MAX_LOCKOUT_SECS}, got {}",
                self.attempts.lockout_secs
            ));
        }
        if self.recognizer.feedback_delay_ms > MAX_FEEDBACK_DELAY_MS {
            errors.push(format!(
                "recognizer.feedback_delay_ms must be <= {MAX_FEEDBACK_DELAY_MS}, got {}",
                self.recognizer.feedback_delay_ms
            ));
        }

        errors
    }

    /// Recognizer thresholds in core form.
    #[must_use]
    pub fn recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            detection_ratio: self.recognizer.detection_ratio,
            minimum_length: self.recognizer.minimum_length,
            feedback_delay: Duration::from_millis(self.recognizer.feedback_delay_ms),
        }
    }

    /// Attempt limits in tracker form. `lockout_secs = 0` locks until reset.
    #[must_use]
    pub fn attempt_policy(&self) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: self.attempts.max_attempts,
            lockout: (self.attempts.lockout_secs > 0)
                .then(|| Duration::from_secs(self.attempts.lockout_secs)),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Recognizer thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerPolicyConfig {
    /// Detection radius relative to the cell edge.
    pub detection_ratio: f32,
    /// Shortest pattern that counts as an attempt.
    pub minimum_length: usize,
    /// How long a finished trace stays visible, in milliseconds.
    pub feedback_delay_ms: u64,
}

impl Default for RecognizerPolicyConfig {
    fn default() -> Self {
        Self {
            detection_ratio: DEFAULT_DETECTION_RATIO,
            minimum_length: DEFAULT_MINIMUM_LENGTH,
            feedback_delay_ms: DEFAULT_FEEDBACK_DELAY.as_millis() as u64,
        }
    }
}

/// The reference pattern and the role it grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockPolicyConfig {
    /// Reference pattern, written `"0-1-2-5-8"`.
    #[serde(with = "pattern_text")]
    pub pattern: Pattern,
    /// Role granted on unlock.
    pub role: Role,
}

impl Default for UnlockPolicyConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::from_indices(&[0, 1, 2, 5, 8]).unwrap_or_default(),
            role: Role::Elder,
        }
    }
}

/// Failed-attempt limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptPolicyConfig {
    /// Consecutive failures before lockout.
    pub max_attempts: u32,
    /// Lockout length in seconds; 0 locks until the gate is reset.
    pub lockout_secs: u64,
}

impl Default for AttemptPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_secs: DEFAULT_LOCKOUT.as_secs(),
        }
    }
}

mod pattern_text {
    use plock_core::Pattern;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(pattern: &Pattern, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(pattern)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pattern, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
