//! Key generator configuration.
//!
//! The planning mode is resolved here, once, and then handed to the core as a
//! plain value. Nothing below the factory reads configuration.

use mdkey_core::PlanMode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for [`KeyGeneratorFactory`](crate::KeyGeneratorFactory).
///
/// # Example
///
/// ```
/// use mdkey::KeyGenConfig;
/// use mdkey_core::PlanMode;
///
/// let config = KeyGenConfig::from_json_str(r#"{ "plan_mode": "incremented_fill" }"#).unwrap();
/// assert_eq!(config.plan_mode, PlanMode::IncrementedFill);
///
/// let config = KeyGenConfig::new().fully_filled(true);
/// assert_eq!(config.plan_mode, PlanMode::Minimal);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyGenConfig {
    /// How bit widths are derived from cardinalities.
    /// Default: [`PlanMode::Minimal`]
    pub plan_mode: PlanMode,
}

impl KeyGenConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planning mode.
    #[must_use]
    pub const fn plan_mode(mut self, mode: PlanMode) -> Self {
        self.plan_mode = mode;
        self
    }

    /// Set the mode from the legacy "fully filled bits" flag.
    ///
    /// Fully filled keys give every dimension its own field; otherwise
    /// adjacent dimensions share fields.
    #[must_use]
    pub const fn fully_filled(self, fully_filled: bool) -> Self {
        self.plan_mode(PlanMode::from_incremented_fill(!fully_filled))
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the input is not a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serialize the configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}
