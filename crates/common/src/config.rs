//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Cursor mapping parameters.
    pub pointer: PointerDefaults,

    /// Blink-to-click parameters.
    pub blink: BlinkDefaults,

    /// Calibration parameters.
    pub calibration: CalibrationDefaults,

    /// Dictation pipeline parameters.
    pub dictation: DictationDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// How landmark motion turns into a cursor target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MappingModeSetting {
    /// Displacement against a fixed anchor, accumulated onto a running target.
    #[default]
    AnchorCumulative,
    /// Displacement against an anchor that follows the head with smoothing.
    SmoothedBaseline,
    /// The target is an absolute screen point (calibrated model or raw gaze).
    AbsoluteGaze,
}

/// Which landmarks feed the aggregate head position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkSubsetSetting {
    #[default]
    All,
    HeadAnchors,
    Custom(Vec<usize>),
}

/// Default cursor mapping parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerDefaults {
    pub mode: MappingModeSetting,

    /// Multiplier applied to landmark displacement (pixels per pixel).
    pub sensitivity: f64,

    /// Exponential smoothing factor in (0, 1]; lower means smoother.
    pub smoothing_alpha: f64,

    /// Per-frame pixel bias added for a non-center gaze direction.
    pub nudge_step_px: f64,

    pub landmarks: LandmarkSubsetSetting,

    /// Screen size the cursor is clamped to.
    pub screen_width: u32,
    pub screen_height: u32,
}

/// Default blink parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkDefaults {
    /// Blink duration (seconds) at which a click becomes a press-and-hold.
    pub long_press_secs: f64,
}

/// Default calibration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationDefaults {
    /// Threshold samples required per eye before calibration is complete.
    pub threshold_frames: usize,

    /// Minimum (eye, screen) pairs before a regression can be fit.
    pub min_regression_samples: usize,

    /// Expected fraction of the eye area covered by the iris.
    pub target_iris_ratio: f64,

    /// Border (pixels) excluded when measuring the iris ratio.
    pub margin_px: u32,

    /// 3x3 erosion passes applied before binarization.
    pub erode_iterations: u32,
}

/// Default dictation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationDefaults {
    /// Maximum queued audio chunks; overflow drops the oldest.
    pub queue_capacity: usize,

    /// Utterance that stops dictation when repeated.
    pub stop_phrase: String,

    /// Consecutive repetitions of `stop_phrase` that trigger a stop.
    pub stop_repeat: usize,

    /// How long the consumer blocks on the queue before rechecking the stop flag.
    pub poll_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "facecursor_tracking=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for PointerDefaults {
    fn default() -> Self {
        Self {
            mode: MappingModeSetting::AnchorCumulative,
            sensitivity: 2.0,
            smoothing_alpha: 0.1,
            nudge_step_px: 0.0,
            landmarks: LandmarkSubsetSetting::All,
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

impl Default for BlinkDefaults {
    fn default() -> Self {
        Self {
            long_press_secs: 1.0,
        }
    }
}

impl Default for CalibrationDefaults {
    fn default() -> Self {
        Self {
            threshold_frames: 20,
            min_regression_samples: 4,
            target_iris_ratio: 0.48,
            margin_px: 5,
            erode_iterations: 3,
        }
    }
}

impl Default for DictationDefaults {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            stop_phrase: "end".to_string(),
            stop_repeat: 3,
            poll_interval_ms: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("facecursor").join("config.json")
}
