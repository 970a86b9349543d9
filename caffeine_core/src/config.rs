//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/caffeine/config.toml`.

use crate::classify::{Classifier, MenuItem};
use crate::presets::{default_presets, Preset};
use crate::resolution::DEFAULT_TARGET_SAMPLES;
use crate::series::SeriesParams;
use crate::{Error, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Presets added to (or shadowing) the built-in ones
    #[serde(default)]
    pub presets: Vec<Preset>,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub decay: DecayConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Decay model parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecayConfig {
    #[serde(default = "default_half_life_hours")]
    pub half_life_hours: f64,

    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            half_life_hours: default_half_life_hours(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

/// Output sampling parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_target_samples")]
    pub target_samples: u32,

    #[serde(default = "default_knot_offset_seconds")]
    pub knot_offset_seconds: i64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target_samples: default_target_samples(),
            knot_offset_seconds: default_knot_offset_seconds(),
        }
    }
}

/// Extra classification rules
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub menu: Vec<MenuItem>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("caffeine")
}

fn default_half_life_hours() -> f64 {
    4.0
}

fn default_lookback_hours() -> f64 {
    72.0
}

fn default_target_samples() -> u32 {
    DEFAULT_TARGET_SAMPLES
}

fn default_knot_offset_seconds() -> i64 {
    60
}

/// Upper bound for configured durations, well inside what `DateTime` can
/// be shifted by.
const MAX_SECONDS: i64 = 1000 * 365 * 24 * 3600;
const MAX_HOURS: f64 = MAX_SECONDS as f64 / 3600.0;

fn hours_to_duration(hours: f64) -> Duration {
    let hours = hours.clamp(0.0, MAX_HOURS);
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

fn check_hours(name: &str, hours: f64) -> Result<()> {
    if hours > MAX_HOURS {
        return Err(Error::Config(format!(
            "{} must be at most {} hours, got {}",
            name, MAX_HOURS, hours
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("caffeine").join("config.toml")
    }

    /// Reject values that would make the level computation meaningless
    pub fn validate(&self) -> Result<()> {
        let decay = &self.decay;
        if !(decay.half_life_hours.is_finite() && decay.half_life_hours > 0.0) {
            return Err(Error::Config(format!(
                "half_life_hours must be positive, got {}",
                decay.half_life_hours
            )));
        }
        if !(decay.lookback_hours.is_finite() && decay.lookback_hours >= 0.0) {
            return Err(Error::Config(format!(
                "lookback_hours must not be negative, got {}",
                decay.lookback_hours
            )));
        }
        check_hours("half_life_hours", decay.half_life_hours)?;
        check_hours("lookback_hours", decay.lookback_hours)?;
        if self.sampling.target_samples == 0 {
            return Err(Error::Config("target_samples must be at least 1".into()));
        }
        let knot_offset = self.sampling.knot_offset_seconds;
        if knot_offset < 0 {
            return Err(Error::Config(format!(
                "knot_offset_seconds must not be negative, got {}",
                knot_offset
            )));
        }
        if knot_offset > MAX_SECONDS {
            return Err(Error::Config(format!(
                "knot_offset_seconds must be at most {}, got {}",
                MAX_SECONDS, knot_offset
            )));
        }
        Ok(())
    }

    /// Series generation constants derived from this config
    pub fn series_params(&self) -> SeriesParams {
        SeriesParams {
            half_life: hours_to_duration(self.decay.half_life_hours),
            lookback: hours_to_duration(self.decay.lookback_hours),
            knot_offset: Duration::seconds(
                self.sampling.knot_offset_seconds.clamp(0, MAX_SECONDS),
            ),
            target_samples: self.sampling.target_samples,
        }
    }

    /// Built-in presets followed by configured ones
    pub fn presets(&self) -> Vec<Preset> {
        let mut presets = default_presets();
        presets.extend(self.presets.iter().cloned());
        presets
    }

    /// Classifier with the configured menu additions
    pub fn classifier(&self) -> Classifier {
        Classifier::with_menu(&self.classifier.menu)
    }

    /// Path of the event log inside the data directory
    pub fn events_path(data_dir: &Path) -> PathBuf {
        data_dir.join("events.jsonl")
    }
}
