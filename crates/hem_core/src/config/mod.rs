//! # Engine Configuration Module
//!
//! All tunable detection windows in one place.
//!
//! ## Usage
//! ```rust
//! use hem_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let extended = EngineConfig::extended();
//! assert!(extended.thresholds.combo_string_timeout_frames > config.thresholds.combo_string_timeout_frames);
//! ```

mod thresholds_config;

pub use thresholds_config::ThresholdsConfig;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacity of each competitor's combo string log.
pub const COMBO_STRING_CAPACITY: usize = 200;
/// Capacity of each competitor's recovery log.
pub const RECOVERY_CAPACITY: usize = 100;
/// Capacity of each competitor's punish log.
pub const PUNISH_CAPACITY: usize = 150;
/// Stock slots per competitor.
pub const STOCK_COUNT: usize = 4;
/// Competitors per match.
pub const COMPETITOR_COUNT: usize = 2;
/// Simulation frames per second, used for report time conversions.
pub const FRAMES_PER_SECOND: f32 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Detection windows
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

impl EngineConfig {
    /// 45-frame windows everywhere.
    pub fn legacy() -> Self {
        Self { thresholds: ThresholdsConfig::legacy() }
    }

    /// 60-frame windows everywhere.
    pub fn extended() -> Self {
        Self { thresholds: ThresholdsConfig::extended() }
    }

    /// Load the threshold profile named by `HEM_THRESHOLD_PROFILE`.
    pub fn from_env_or_default() -> Self {
        Self { thresholds: ThresholdsConfig::from_env_or_default() }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg, EngineConfig::legacy());
        assert_eq!(cfg.thresholds.recovery_landing_frames, 45);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{"thresholds":{"combo_string_timeout_frames":60}}"#)
            .unwrap();
        assert_eq!(cfg.thresholds.combo_string_timeout_frames, 60);
        assert_eq!(cfg.thresholds.punish_reset_frames, 45);

        let empty = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, EngineConfig::default());
    }

    #[test]
    fn test_json_rejects_zero_threshold() {
        let err = EngineConfig::from_json_str(r#"{"thresholds":{"recovery_landing_frames":0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroThreshold { name: "recovery_landing_frames" }));
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let cfg = EngineConfig::extended();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), cfg);
    }
}
