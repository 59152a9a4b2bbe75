use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::params::LIGHT_DATA_MAX_LIMIT;

/// Global configuration loaded from `~/.config/nightsky/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightskyConfig {
    /// Base URL of the data API (the `/light-data` and `/tbia-data` endpoints live under it).
    pub api_base_url: String,
    /// Records requested per page.
    pub batch_size: u32,
    /// Pause between page requests in milliseconds (throttles the endpoint).
    pub page_delay_ms: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Progress percentages at which accumulated data is re-published.
    #[serde(default = "default_milestones")]
    pub publish_milestones: Vec<u8>,
}

fn default_milestones() -> Vec<u8> {
    vec![25, 50, 75, 100]
}

impl Default for NightskyConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api".to_string(),
            batch_size: 5000,
            page_delay_ms: 100,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            publish_milestones: default_milestones(),
        }
    }
}

impl NightskyConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject values the loader cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > LIGHT_DATA_MAX_LIMIT {
            anyhow::bail!(
                "batch_size must be between 1 and {} (got {})",
                LIGHT_DATA_MAX_LIMIT,
                self.batch_size
            );
        }
        if let Some(bad) = self
            .publish_milestones
            .iter()
            .find(|p| **p == 0 || **p > 100)
        {
            anyhow::bail!("publish_milestones entries must be 1..=100 (got {})", bad);
        }
        url::Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url: {}", self.api_base_url))?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("nightsky")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<NightskyConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: NightskyConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<NightskyConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = NightskyConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}
