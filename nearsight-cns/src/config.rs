//! Top-level configuration for a nearsight session

use crate::proximity::ProximityConfig;
use nearsight_core::{Error, Result};
use nearsight_eye::VisionConfig;
use nearsight_sc::CueConfig;
use nearsight_spk::SpeechConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Every tunable of the alert engine, one section per component.
///
/// Missing sections and fields fall back to their defaults, so an empty
/// file yields the stock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearsightConfig {
    pub vision: VisionConfig,
    pub proximity: ProximityConfig,
    pub cue: CueConfig,
    pub speech: SpeechConfig,
}

impl NearsightConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.vision.validate().map_err(|e| format!("vision: {}", e))?;
        self.proximity
            .validate()
            .map_err(|e| format!("proximity: {}", e))?;
        self.cue.validate().map_err(|e| format!("cue: {}", e))?;
        self.speech.validate().map_err(|e| format!("speech: {}", e))?;

        let widest_cue = self.proximity.threshold_meters
            + self.proximity.deadband_meters;
        if widest_cue * self.proximity.interval_factor > self.cue.max_interval_secs {
            return Err(format!(
                "cue: max interval {}s is shorter than the slowest alert repeat",
                self.cue.max_interval_secs
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate().map_err(Error::Configuration)?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded configuration");
        Self::from_toml_str(&source)
    }
}
