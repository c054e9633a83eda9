//! Capture configuration.
//!
//! Print aspect ratios are constants of the format and not part of this
//! configuration. Neither is flash: still captures never fire it.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trade-off between capture latency and image quality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityPrioritization {
    /// Fastest capture.
    Speed,
    /// Middle ground.
    Balanced,
    /// Best image quality.
    #[default]
    Quality,
}

/// Session-wide capture preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPreset {
    /// Full-resolution still photos.
    #[default]
    Photo,
    /// Reduced resolution suitable for preview-only use.
    High,
}

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePosition {
    /// Rear camera.
    #[default]
    Back,
    /// Selfie camera.
    Front,
}

/// Configuration for the capture session controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera to bind.
    pub position: DevicePosition,
    /// Session preset applied during configuration.
    pub preset: SessionPreset,
    /// Maximum quality prioritization of the photo output.
    pub quality: QualityPrioritization,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            position: DevicePosition::Back,
            preset: SessionPreset::Photo,
            quality: QualityPrioritization::Quality,
        }
    }
}

impl CaptureConfig {
    /// Validates the configuration parameters.
    ///
    /// Still captures need the full-resolution photo preset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preset != SessionPreset::Photo {
            return Err(ConfigError::UnsupportedPreset);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("only the photo session preset is supported")]
    UnsupportedPreset,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Controller settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Simulated camera settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Settings for the simulated camera used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Sensor width in pixels.
    pub sensor_width: u32,
    /// Sensor height in pixels.
    pub sensor_height: u32,
    /// EXIF orientation value reported with each frame.
    pub orientation: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sensor_width: 4032,
            sensor_height: 3024,
            orientation: 6,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quality, QualityPrioritization::Quality);
    }

    #[test]
    fn test_preview_preset_rejected() {
        let config = CaptureConfig {
            preset: SessionPreset::High,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedPreset)
        ));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            quality = "balanced"

            [simulation]
            orientation = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.capture.quality, QualityPrioritization::Balanced);
        assert_eq!(config.capture.position, DevicePosition::Back);
        assert_eq!(config.simulation.orientation, 1);
        assert_eq!(config.simulation.sensor_width, 4032);
    }

    #[test]
    fn test_parse_rejects_invalid_capture() {
        let result = FileConfig::from_toml("[capture]\npreset = \"high\"\n");
        assert!(matches!(result, Err(ConfigError::UnsupportedPreset)));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            FileConfig::from_toml("capture = 3"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
