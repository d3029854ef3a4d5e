//! Configuration types for moodtrail.
//!
//! [`Config::load`] reads `~/.config/moodtrail/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).
//!
//! The `[normalizer]` defaults are the thresholds the dashboard's quality
//! labels were calibrated against. Changing them changes the numbers users see.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[normalizer]
score_min                  = -100
score_max                  = 100
average_override_threshold = 10.0
default_positive_hours     = 8.0
default_negative_hours     = 4.0
default_neutral_hours      = 12.0
day_hours                  = 24.0
hour_tolerance             = 1.0
placeholder_insight        = "insufficient analysis data"
fallback_time_label        = "12:00"

[summary]
expected_slots = 48
excellent_pct  = 80.0
good_pct       = 60.0
fair_pct       = 30.0

[store]
root = "data/timelines"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/moodtrail/config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// `[normalizer]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_score_min")]
    pub score_min: i32,
    #[serde(default = "default_score_max")]
    pub score_max: i32,
    /// An upstream `averageScore` further than this from the recomputed mean
    /// is treated as corrupt.
    #[serde(default = "default_average_override_threshold")]
    pub average_override_threshold: f64,
    #[serde(default = "default_positive_hours")]
    pub default_positive_hours: f64,
    #[serde(default = "default_negative_hours")]
    pub default_negative_hours: f64,
    #[serde(default = "default_neutral_hours")]
    pub default_neutral_hours: f64,
    #[serde(default = "default_day_hours")]
    pub day_hours: f64,
    #[serde(default = "default_hour_tolerance")]
    pub hour_tolerance: f64,
    #[serde(default = "default_placeholder_insight")]
    pub placeholder_insight: String,
    #[serde(default = "default_fallback_time_label")]
    pub fallback_time_label: String,
}

fn default_score_min() -> i32 { -100 }
fn default_score_max() -> i32 { 100 }
fn default_average_override_threshold() -> f64 { 10.0 }
fn default_positive_hours() -> f64 { 8.0 }
fn default_negative_hours() -> f64 { 4.0 }
fn default_neutral_hours() -> f64 { 12.0 }
fn default_day_hours() -> f64 { 24.0 }
fn default_hour_tolerance() -> f64 { 1.0 }
fn default_placeholder_insight() -> String { "insufficient analysis data".to_string() }
fn default_fallback_time_label() -> String { "12:00".to_string() }

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            score_min: default_score_min(),
            score_max: default_score_max(),
            average_override_threshold: default_average_override_threshold(),
            default_positive_hours: default_positive_hours(),
            default_negative_hours: default_negative_hours(),
            default_neutral_hours: default_neutral_hours(),
            day_hours: default_day_hours(),
            hour_tolerance: default_hour_tolerance(),
            placeholder_insight: default_placeholder_insight(),
            fallback_time_label: default_fallback_time_label(),
        }
    }
}

/// `[summary]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryConfig {
    /// Slots in a fully measured day (48 at a 30-minute cadence).
    #[serde(default = "default_expected_slots")]
    pub expected_slots: usize,
    #[serde(default = "default_excellent_pct")]
    pub excellent_pct: f64,
    #[serde(default = "default_good_pct")]
    pub good_pct: f64,
    #[serde(default = "default_fair_pct")]
    pub fair_pct: f64,
}

fn default_expected_slots() -> usize { 48 }
fn default_excellent_pct() -> f64 { 80.0 }
fn default_good_pct() -> f64 { 60.0 }
fn default_fair_pct() -> f64 { 30.0 }

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            expected_slots: default_expected_slots(),
            excellent_pct: default_excellent_pct(),
            good_pct: default_good_pct(),
            fair_pct: default_fair_pct(),
        }
    }
}

/// `[store]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

fn default_store_root() -> PathBuf { PathBuf::from("data/timelines") }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { root: default_store_root() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/moodtrail/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit config file layered on top of the built-in defaults.
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("moodtrail")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
