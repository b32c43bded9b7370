use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cycle::TintRange;
use crate::location::Coordinates;
use crate::weather::{Units, DEFAULT_BASE_URL};

/// Root configuration, loaded from an optional YAML file.
///
/// Every field has a default so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fixed location; auto-discovered from the IP address when absent
    #[serde(default)]
    pub location: Option<Coordinates>,

    #[serde(default)]
    pub weather: WeatherConfig,

    /// Temperature range mapped onto the red tint
    #[serde(default)]
    pub tint: TintRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key; falls back to `OPENWEATHER_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            base_url: default_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document, treat it as all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tint.min.is_nan() || self.tint.max.is_nan() || self.tint.min >= self.tint.max {
            return Err(ConfigError::Invalid(format!(
                "tint.min ({}) must be below tint.max ({})",
                self.tint.min, self.tint.max
            )));
        }
        if let Some(loc) = &self.location {
            if !loc.is_valid() {
                return Err(ConfigError::Invalid(format!(
                    "location ({}, {}) out of range",
                    loc.latitude, loc.longitude
                )));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
