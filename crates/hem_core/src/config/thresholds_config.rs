//! Detection window thresholds
//!
//! Two firmware generations disagree on the recovery-landing and combo
//! timeout windows (45 vs 60 frames), so both are available as presets.
//!
//! | Threshold | legacy | extended |
//! |-----------|--------|----------|
//! | recovery landing | 45 | 60 |
//! | punish reset | 45 | 60 |
//! | combo string timeout | 45 | 60 |
//!
//! ## Environment Variables
//!
//! - `HEM_THRESHOLD_PROFILE`: Select preset (legacy, extended)

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Frames a recovering competitor must stay on stage before the
    /// recovery counts as successful
    pub recovery_landing_frames: u32,
    /// Frames without a confirmed hit after which a punish ends
    pub punish_reset_frames: u32,
    /// Frames without further damage after which a combo string ends
    pub combo_string_timeout_frames: u32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self::legacy()
    }
}

impl ThresholdsConfig {
    pub fn legacy() -> Self {
        Self {
            recovery_landing_frames: 45,
            punish_reset_frames: 45,
            combo_string_timeout_frames: 45,
        }
    }

    pub fn extended() -> Self {
        Self {
            recovery_landing_frames: 60,
            punish_reset_frames: 60,
            combo_string_timeout_frames: 60,
        }
    }

    /// Preset by name; `None` for unknown names.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "legacy" | "default" => Some(Self::legacy()),
            "extended" => Some(Self::extended()),
            _ => None,
        }
    }

    /// Load from environment variable HEM_THRESHOLD_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        env::var("HEM_THRESHOLD_PROFILE")
            .ok()
            .and_then(|name| Self::preset(&name))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recovery_landing_frames == 0 {
            return Err(ConfigError::ZeroThreshold { name: "recovery_landing_frames" });
        }
        if self.punish_reset_frames == 0 {
            return Err(ConfigError::ZeroThreshold { name: "punish_reset_frames" });
        }
        if self.combo_string_timeout_frames == 0 {
            return Err(ConfigError::ZeroThreshold { name: "combo_string_timeout_frames" });
        }
        Ok(())
    }
}
