//! Engine configuration with documented constants
//!
//! Fixed at startup. Every tunable lives here with an explanation of what
//! it controls; everything else in the engine is derived from these.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{EngineError, Result};
use crate::core::types::duration_from_secs;

/// Configuration for the technique engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum age of an input still eligible for matching (seconds)
    ///
    /// Inputs older than this are skipped by resolution but stay in the
    /// buffer until capacity pushes them out.
    #[serde(rename = "combo_window_seconds")]
    pub combo_window: f64,

    /// Maximum input events retained per caster
    ///
    /// Should be at least the longest registered sequence, otherwise long
    /// techniques can be evicted before they complete.
    pub buffer_capacity: usize,

    /// Time an interrupted caster spends stunned before returning to Idle
    /// (seconds), regardless of which phase was broken.
    #[serde(rename = "interrupted_recovery_delay_seconds")]
    pub interrupted_recovery_delay: f64,

    /// Cast speed used when the stat subsystem has none for a caster
    ///
    /// Cast time is divided by this; 2.0 prepares twice as fast.
    pub default_cast_speed_multiplier: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            combo_window: 1.5,
            buffer_capacity: 16,
            interrupted_recovery_delay: 0.5,
            default_cast_speed_multiplier: 1.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn combo_window(&self) -> Duration {
        duration_from_secs(self.combo_window)
    }

    pub fn interrupted_recovery_delay(&self) -> Duration {
        duration_from_secs(self.interrupted_recovery_delay)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.combo_window.is_finite() || self.combo_window <= 0.0 {
            return Err(format!(
                "combo_window_seconds ({}) must be positive",
                self.combo_window
            ));
        }

        if self.buffer_capacity == 0 {
            return Err("buffer_capacity must be at least 1".into());
        }

        if !self.interrupted_recovery_delay.is_finite() || self.interrupted_recovery_delay < 0.0 {
            return Err(format!(
                "interrupted_recovery_delay_seconds ({}) must be non-negative",
                self.interrupted_recovery_delay
            ));
        }

        if !self.default_cast_speed_multiplier.is_finite()
            || self.default_cast_speed_multiplier <= 0.0
        {
            return Err(format!(
                "default_cast_speed_multiplier ({}) must be positive",
                self.default_cast_speed_multiplier
            ));
        }

        Ok(())
    }
}
