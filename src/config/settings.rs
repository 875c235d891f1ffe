//! Pipeline settings loaded from `config/mindshare.toml`.
//!
//! Every section and key is optional; anything missing falls back to the
//! built-in defaults below.

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ViewError;

pub const ENV_CONFIG_PATH: &str = "MINDSHARE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/mindshare.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub validator: ValidatorConfig,
    pub discovery: DiscoveryConfig,
}

/// Total contributor population per tier; drives the normalization ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierPopulation {
    #[serde(rename = "1")]
    pub tier1: u32,
    #[serde(rename = "2")]
    pub tier2: u32,
    #[serde(rename = "3")]
    pub tier3: u32,
}

impl Default for TierPopulation {
    fn default() -> Self {
        Self {
            tier1: 5,
            tier2: 15,
            tier3: 33,
        }
    }
}

/// Which band table maps the normalized score to a category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryScale {
    /// Bands over 0..=1000, the range the scorer actually produces.
    #[default]
    Mindshare,
    /// Bands over 0..=100; scores above 100 fail range validation.
    Percent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub total_tier_counts: TierPopulation,
    pub category_scale: CategoryScale,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub min_content_length: usize,
    pub noise_markers: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_content_length: 10,
            noise_markers: vec![
                "Forwarded from".to_string(),
                "Reposted from".to_string(),
                "⤷ Repost".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub fresh_window_hours: i64,
    pub fresh_limit: usize,
    pub momentum_window_hours: i64,
    pub revived_min_age_hours: i64,
    pub revived_recent_hours: i64,
    pub generic_window_hours: i64,
    pub default_page_size: usize,
    /// Established assets hidden from every view (e.g. `$BTC`).
    pub excluded_symbols: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fresh_window_hours: 6,
            fresh_limit: 20,
            momentum_window_hours: 24,
            revived_min_age_hours: 7 * 24,
            revived_recent_hours: 12,
            generic_window_hours: 3 * 24,
            default_page_size: 25,
            excluded_symbols: Vec::new(),
        }
    }
}

/// Upper bound for any discovery window (ten years).
pub const MAX_WINDOW_HOURS: i64 = 10 * 365 * 24;

fn window(name: &'static str, hours: i64) -> Result<Duration, ViewError> {
    let out_of_range = ViewError::Window {
        name,
        hours,
        max: MAX_WINDOW_HOURS,
    };
    if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
        return Err(out_of_range);
    }
    Duration::try_hours(hours).ok_or(out_of_range)
}

impl DiscoveryConfig {
    pub fn fresh_window(&self) -> Result<Duration, ViewError> {
        window("fresh_window_hours", self.fresh_window_hours)
    }
    pub fn momentum_window(&self) -> Result<Duration, ViewError> {
        window("momentum_window_hours", self.momentum_window_hours)
    }
    pub fn revived_min_age(&self) -> Result<Duration, ViewError> {
        window("revived_min_age_hours", self.revived_min_age_hours)
    }
    pub fn revived_recent(&self) -> Result<Duration, ViewError> {
        window("revived_recent_hours", self.revived_recent_hours)
    }
    pub fn generic_window(&self) -> Result<Duration, ViewError> {
        window("generic_window_hours", self.generic_window_hours)
    }

    /// Every window must be positive and at most `MAX_WINDOW_HOURS`.
    pub fn validate(&self) -> Result<(), ViewError> {
        self.fresh_window()?;
        self.momentum_window()?;
        self.revived_min_age()?;
        self.revived_recent()?;
        self.generic_window()?;
        Ok(())
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing mindshare config TOML")?;
        cfg.discovery.validate().context("invalid [discovery] section")?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading mindshare config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $MINDSHARE_CONFIG_PATH
    /// 2) config/mindshare.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }
}
