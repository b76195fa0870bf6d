//! Decoder configuration.
//!
//! Defaults reproduce the reference LED ring setup: a 6 × 8 ring,
//! a 220 luminance threshold shared by calibration and sampling,
//! and a 10 px matching tolerance.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of sides of the LED ring.
pub const SIDE_COUNT: usize = 6;

/// LEDs per side, one per bit of a byte.
pub const LEDS_PER_SIDE: usize = 8;

/// Bright-spot detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Luminance a pixel must exceed to count as lit.
    pub threshold: u8,
    /// Blobs whose enclosing radius is not above this are ignored.
    pub min_radius: f64,
    /// Blobs whose centroid is not above this row are ignored.
    pub max_y: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 220,
            min_radius: 10.0,
            max_y: 1420.0,
        }
    }
}

/// LED calibration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of LEDs calibration tries to register.
    pub target_leds: usize,
    /// Per-axis pixel tolerance under which two centroids are the same LED.
    pub tolerance_px: f64,
    /// Abort calibration when a blob matches several registered LEDs.
    pub fail_on_duplicate_match: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            target_leds: SIDE_COUNT * LEDS_PER_SIDE,
            tolerance_px: 10.0,
            fail_on_duplicate_match: false,
        }
    }
}

/// Transition filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Consecutive identical frames needed to confirm a new pattern.
    pub min_stable_frames: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            min_stable_frames: 4,
        }
    }
}

/// Frame source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Keep every n-th frame (1 keeps all).
    pub frame_skip: u32,
    /// Nominal frame rate of an image sequence, informational only.
    pub frame_rate: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frame_skip: 1,
            frame_rate: 30.0,
        }
    }
}

/// Complete decoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DecoderConfig {
    /// Bright-spot detection, shared with per-frame sampling.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// LED registration.
    #[serde(default)]
    pub calibration: CalibrationConfig,
    /// Transition filtering.
    #[serde(default)]
    pub stability: StabilityConfig,
    /// Frame source.
    #[serde(default)]
    pub source: SourceConfig,
}

impl DecoderConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.detection.min_radius >= 0.0) {
            return Err(ConfigError::InvalidRadius(self.detection.min_radius));
        }
        if !(self.detection.max_y > 0.0) {
            return Err(ConfigError::InvalidBound(self.detection.max_y));
        }
        if self.calibration.target_leds == 0 {
            return Err(ConfigError::InvalidTarget);
        }
        if !(self.calibration.tolerance_px > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.calibration.tolerance_px));
        }
        if self.stability.min_stable_frames == 0 {
            return Err(ConfigError::InvalidStability);
        }
        if self.source.frame_skip == 0 {
            return Err(ConfigError::InvalidFrameSkip);
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: DecoderConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid minimum blob radius {0}")]
    InvalidRadius(f64),
    #[error("invalid vertical bound {0}")]
    InvalidBound(f64),
    #[error("LED target must be at least 1")]
    InvalidTarget,
    #[error("invalid matching tolerance {0} (must be positive)")]
    InvalidTolerance(f64),
    #[error("stable frame requirement must be at least 1")]
    InvalidStability,
    #[error("frame skip must be at least 1")]
    InvalidFrameSkip,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = DecoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.calibration.target_leds, 48);
    }

    #[test]
    fn test_zero_tolerance_invalid() {
        let mut config = DecoderConfig::default();
        config.calibration.tolerance_px = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DecoderConfig = toml::from_str(
            r#"
            [detection]
            threshold = 190

            [stability]
            min_stable_frames = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.threshold, 190);
        assert_eq!(config.detection.min_radius, 10.0);
        assert_eq!(config.stability.min_stable_frames, 6);
        assert_eq!(config.calibration.tolerance_px, 10.0);
        assert_eq!(config.source.frame_skip, 1);
    }

    #[test]
    fn test_missing_file_reported() {
        assert!(matches!(
            DecoderConfig::from_file("/nonexistent/ledring.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
