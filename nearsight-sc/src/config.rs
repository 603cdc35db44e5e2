//! Configuration for the proximity sound cue

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sound cue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Audio asset played on every repeat
    pub asset: PathBuf,

    /// Repeat interval used until the first retime (seconds)
    pub initial_interval_secs: f32,

    /// Upper bound on any repeat interval (seconds)
    pub max_interval_secs: f32,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            asset: PathBuf::from("beep.m4a"),
            initial_interval_secs: 5.0,
            max_interval_secs: 60.0,
        }
    }
}

impl CueConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.asset.as_os_str().is_empty() {
            return Err("Cue asset path cannot be empty".to_string());
        }

        if !self.max_interval_secs.is_finite() || self.max_interval_secs <= 0.0 {
            return Err("Max interval must be a positive number of seconds".to_string());
        }

        if !self.initial_interval_secs.is_finite() || self.initial_interval_secs < 0.0 {
            return Err("Initial interval must be a non-negative number of seconds".to_string());
        }

        if self.initial_interval_secs > self.max_interval_secs {
            return Err("Initial interval cannot exceed max interval".to_string());
        }

        Ok(())
    }
}
