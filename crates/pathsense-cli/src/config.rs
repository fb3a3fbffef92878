//! Configuration – reads/writes `~/.pathsense/config.toml`.

use pathsense_feedback::{FeedbackSettings, SessionConfig, Units};
use pathsense_perception::PipelineConfig;
use pathsense_types::PathSenseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted configuration.  Every section and field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Obstacle pipeline constants.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Voice / haptic / units preferences.
    #[serde(default)]
    pub feedback: FeedbackSettings,

    /// Frame gating and announcement timing.
    #[serde(default)]
    pub session: SessionConfig,

    /// Whether the recording device has a depth sensor.  Only changes the
    /// startup greeting.
    #[serde(default = "default_lidar_available")]
    pub lidar_available: bool,
}

fn default_lidar_available() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            feedback: FeedbackSettings::default(),
            session: SessionConfig::default(),
            lidar_available: default_lidar_available(),
        }
    }
}

/// Return the path to `~/.pathsense/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".pathsense").join("config.toml")
}

/// Load the config from `path`, falling back to defaults when the file does
/// not exist.  Environment overrides are applied in both cases.
pub fn load_or_default(path: &Path) -> Result<Config, PathSenseError> {
    let mut cfg = load_from(path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, PathSenseError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        PathSenseError::Io(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| PathSenseError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(Some(cfg))
}

/// Apply `PATHSENSE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PATHSENSE_UNITS` | `feedback.units` (`meters` / `feet`) |
/// | `PATHSENSE_VOICE` | `feedback.voice` |
/// | `PATHSENSE_HAPTIC` | `feedback.haptic` |
/// | `PATHSENSE_PEAK_THRESHOLD` | `pipeline.peak_threshold` |
/// | `PATHSENSE_FRAME_INTERVAL_MS` | `session.frame_interval_ms` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PATHSENSE_UNITS") {
        match v.to_ascii_lowercase().as_str() {
            "meters" => cfg.feedback.units = Units::Meters,
            "feet" => cfg.feedback.units = Units::Feet,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("PATHSENSE_VOICE")
        && let Ok(on) = v.parse::<bool>()
    {
        cfg.feedback.voice = on;
    }
    if let Ok(v) = std::env::var("PATHSENSE_HAPTIC")
        && let Ok(on) = v.parse::<bool>()
    {
        cfg.feedback.haptic = on;
    }
    if let Ok(v) = std::env::var("PATHSENSE_PEAK_THRESHOLD")
        && let Ok(threshold) = v.parse::<u32>()
    {
        cfg.pipeline.peak_threshold = threshold;
    }
    if let Ok(v) = std::env::var("PATHSENSE_FRAME_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.session.frame_interval_ms = ms;
    }
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), PathSenseError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PathSenseError::Io(format!("Failed to create config directory: {}", e))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| PathSenseError::Serialization(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        PathSenseError::Io(format!("Failed to write config at {}: {}", path.display(), e))
    })
}
