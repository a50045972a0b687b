//! Pipeline configuration.
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the tuned defaults.
//!
//! ```toml
//! frame_rate_hz = 12.0
//!
//! [stabilizer]
//! stable_frames = 4
//!
//! [thresholds]
//! mouth_open_scream = 0.3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration::DEFAULT_CALIBRATION_FRAMES;
use crate::classifier::{AdaptiveConfig, Thresholds, ToothyConfig};
use crate::error::{Error, Result};
use crate::presence::PresenceConfig;
use crate::reaction::AssetMap;
use crate::stabilizer::{DEFAULT_COOLDOWN_MS, DEFAULT_STABLE_FRAMES};
use crate::tongue::TongueConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { alpha: 0.25 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    pub stable_frames: u32,
    pub cooldown_ms: f64,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            stable_frames: DEFAULT_STABLE_FRAMES,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Minimum `jawOpen + mouthSmile + eyeSquint` to trust blendshapes.
    pub min_blend_strength: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_blend_strength: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub frames: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_CALIBRATION_FRAMES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection cycles per second.
    pub frame_rate_hz: f64,
    /// Attach a [`DebugRecord`](crate::DebugRecord) to every output.
    pub debug: bool,
    pub smoothing: SmoothingConfig,
    pub stabilizer: StabilizerConfig,
    pub thresholds: Thresholds,
    pub source: SourceConfig,
    pub calibration: CalibrationConfig,
    pub adaptive: AdaptiveConfig,
    pub presence: PresenceConfig,
    pub tongue: TongueConfig,
    pub toothy: ToothyConfig,
    pub assets: AssetMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate_hz: 12.0,
            debug: false,
            smoothing: SmoothingConfig::default(),
            stabilizer: StabilizerConfig::default(),
            thresholds: Thresholds::default(),
            source: SourceConfig::default(),
            calibration: CalibrationConfig::default(),
            adaptive: AdaptiveConfig::default(),
            presence: PresenceConfig::default(),
            tongue: TongueConfig::default(),
            toothy: ToothyConfig::default(),
            assets: AssetMap::default(),
        }
    }
}

impl Config {
    /// Load and validate a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(Error::InvalidConfig(msg))
        }

        if !(self.smoothing.alpha > 0.0 && self.smoothing.alpha <= 1.0) {
            return invalid(format!("smoothing.alpha must be in (0, 1], got {}", self.smoothing.alpha));
        }
        if self.stabilizer.stable_frames == 0 {
            return invalid("stabilizer.stable_frames must be at least 1".into());
        }
        if !(self.frame_rate_hz > 0.0) {
            return invalid(format!("frame_rate_hz must be positive, got {}", self.frame_rate_hz));
        }
        if self.calibration.frames == 0 {
            return invalid("calibration.frames must be at least 1".into());
        }
        for (name, value) in [
            ("stabilizer.cooldown_ms", self.stabilizer.cooldown_ms),
            ("presence.hold_ms", self.presence.hold_ms),
            ("presence.stall_ms", self.presence.stall_ms),
            ("tongue.hold_ms", self.tongue.hold_ms),
        ] {
            if !(value >= 0.0) {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
        }
        Ok(())
    }

    /// Interval between detection cycles.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.frame_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stabilizer.stable_frames, 5);
        assert!((config.smoothing.alpha - 0.25).abs() < 1e-12);
    }

    #[test]
    fn partial_sections_override() {
        let config = Config::from_toml_str(
            r#"
            debug = true

            [thresholds]
            mouth_open_scream = 0.3

            [assets]
            grin = "big-grin"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert!((config.thresholds.mouth_open_scream - 0.3).abs() < 1e-12);
        assert!((config.thresholds.smile - 0.35).abs() < 1e-12);
        assert_eq!(config.assets.grin, "big-grin");
        assert_eq!(config.assets.smile, "smile");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[smoothing]\nalpha = 0.0"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[stabilizer]\nstable_frames = 0"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[presence]\nhold_ms = -1.0"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("frame_rate_hz = \"fast\""),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn frame_interval_from_rate() {
        let config = Config::default();
        let ms = config.frame_interval().as_secs_f64() * 1000.0;
        assert!((ms - 83.333).abs() < 0.01);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meme-face.toml");
        std::fs::write(&path, "[tongue]\nenabled = false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.tongue.enabled);

        assert!(matches!(Config::load(dir.path().join("missing.toml")), Err(Error::Io(_))));
    }
}
