use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, RochambeauError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Directory of PNG frames replayed in name order.
    pub frames_dir: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Flip frames horizontally so the player sees a mirror image.
    pub mirror: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// NDJSON landmark recording; without one no hand is ever detected.
    pub landmarks_path: Option<String>,
    /// Score needed to pick up a hand that was not in the previous frame.
    pub min_detection_confidence: f32,
    /// Score needed to keep a hand seen in the previous frame.
    pub min_tracking_confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    pub countdown_step_ms: u64,
    pub countdown_steps: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentConfig {
    pub memory: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub dir: String,
    /// Fail at startup on a missing asset instead of drawing a placeholder.
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub event_log: Option<String>,
    /// Where composited frames of resolved rounds are written.
    pub capture_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RochambeauConfig {
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub round: RoundConfig,
    pub opponent: OpponentConfig,
    pub assets: AssetConfig,
    pub ops: OpsConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frames_dir: "captures/session".into(),
            width: 1280,
            height: 720,
            fps: 30,
            mirror: true,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            landmarks_path: None,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.6,
        }
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            countdown_step_ms: 900,
            countdown_steps: 3,
        }
    }
}

impl RoundConfig {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    pub fn total(&self) -> Duration {
        self.step() * u32::from(self.countdown_steps)
    }
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            memory: 8,
            seed: None,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: "assets".into(),
            strict: false,
        }
    }
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            log_file: None,
            event_log: None,
            capture_dir: None,
        }
    }
}

impl Default for RochambeauConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            detector: DetectorConfig::default(),
            round: RoundConfig::default(),
            opponent: OpponentConfig::default(),
            assets: AssetConfig::default(),
            ops: OpsConfig::default(),
        }
    }
}

impl RochambeauConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            RochambeauError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            RochambeauError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(RochambeauError::Configuration(
                "camera.width and camera.height must be greater than zero".into(),
            ));
        }
        if self.camera.fps == 0 {
            return Err(RochambeauError::Configuration(
                "camera.fps must be greater than zero".into(),
            ));
        }
        for (name, value) in [
            (
                "detector.min_detection_confidence",
                self.detector.min_detection_confidence,
            ),
            (
                "detector.min_tracking_confidence",
                self.detector.min_tracking_confidence,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RochambeauError::Configuration(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.round.countdown_step_ms == 0 {
            return Err(RochambeauError::Configuration(
                "round.countdown_step_ms must be greater than zero".into(),
            ));
        }
        if self.round.countdown_steps == 0 {
            return Err(RochambeauError::Configuration(
                "round.countdown_steps must be greater than zero".into(),
            ));
        }
        if self.opponent.memory == 0 {
            return Err(RochambeauError::Configuration(
                "opponent.memory must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_config_from_file() {
        let temp_path = std::env::temp_dir().join("rochambeau-config-test.toml");
        let config = RochambeauConfig {
            camera: CameraConfig {
                frames_dir: "frames".into(),
                width: 640,
                height: 480,
                fps: 15,
                mirror: false,
            },
            detector: DetectorConfig {
                landmarks_path: Some("hands.ndjson".into()),
                ..Default::default()
            },
            round: RoundConfig {
                countdown_step_ms: 1000,
                countdown_steps: 3,
            },
            opponent: OpponentConfig {
                memory: 5,
                seed: Some(7),
            },
            assets: AssetConfig {
                dir: "assets".into(),
                strict: true,
            },
            ops: OpsConfig {
                log_level: "debug".into(),
                ..Default::default()
            },
        };

        let doc = toml::to_string(&config).expect("serialize config");
        fs::write(&temp_path, doc).expect("write temp config");

        let loaded = RochambeauConfig::from_file(&temp_path).expect("load config");
        assert_eq!(loaded.camera.fps, 15);
        assert_eq!(loaded.opponent.memory, 5);
        assert_eq!(loaded.opponent.seed, Some(7));
        assert_eq!(
            loaded.detector.landmarks_path.as_deref(),
            Some("hands.ndjson")
        );
        assert!(loaded.assets.strict);
        assert!(loaded.ops.event_log.is_none());
        fs::remove_file(&temp_path).expect("cleanup temp config");
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = RochambeauConfig::from_file("/nonexistent/rochambeau.toml").unwrap_err();
        assert!(matches!(err, RochambeauError::Configuration(_)));
    }

    #[test]
    fn round_durations() {
        let round = RoundConfig::default();
        assert_eq!(round.step(), Duration::from_millis(900));
        assert_eq!(round.total(), Duration::from_millis(2700));
    }

    #[test]
    fn validate_configuration_rules() {
        let mut config = RochambeauConfig::default();
        assert!(config.validate().is_ok());

        config.camera.fps = 0;
        assert!(config.validate().is_err());
        config.camera.fps = 30;
        config.detector.min_detection_confidence = 1.5;
        assert!(config.validate().is_err());
        config.detector.min_detection_confidence = 0.7;
        config.round.countdown_steps = 0;
        assert!(config.validate().is_err());
        config.round.countdown_steps = 3;
        config.opponent.memory = 0;
        assert!(config.validate().is_err());
        config.opponent.memory = 8;
        config.camera.width = 0;
        assert!(config.validate().is_err());
        config.camera.width = 1280;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_dev_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/dev.toml");
        let config = RochambeauConfig::from_file(path).expect("load dev config");
        config.validate().expect("dev config validates");
        assert_eq!(config.round.total(), Duration::from_millis(2700));
        assert!(config.opponent.seed.is_none());
    }
}
