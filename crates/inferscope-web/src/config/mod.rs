//! Configuration loading for Inferscope.
//! Reads inferscope.toml from the current directory or the path in INFERSCOPE_CONFIG.
//! A missing file means built-in defaults; BACKEND_API_URL and INFERSCOPE_BIND
//! override the file when set.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use inferscope_client::{Timeouts, DEFAULT_BASE_URL};

pub const CONFIG_PATH_ENV: &str = "INFERSCOPE_CONFIG";
pub const BACKEND_URL_ENV: &str = "BACKEND_API_URL";
pub const BIND_ENV: &str = "INFERSCOPE_BIND";

/// Page sizes offered by the overview page.
pub const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];

/// Stylesheets shipped with this crate, independent of the working directory.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind()       -> String { "127.0.0.1:3001".to_string() }
fn default_static_dir() -> String { DEFAULT_STATIC_DIR.to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,
    #[serde(default = "default_inference_timeout")]
    pub inference_timeout_secs: u64,
}

fn default_base_url()          -> String { DEFAULT_BASE_URL.to_string() }
fn default_health_timeout()    -> u64 { 5 }
fn default_list_timeout()      -> u64 { 10 }
fn default_inference_timeout() -> u64 { 60 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_timeout_secs: default_health_timeout(),
            list_timeout_secs: default_list_timeout(),
            inference_timeout_secs: default_inference_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            health: Duration::from_secs(self.health_timeout_secs),
            listing: Duration::from_secs(self.list_timeout_secs),
            inference: Duration::from_secs(self.inference_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How many submissions the inference picker offers.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

fn default_recent_limit() -> u32 { 100 }
fn default_page_size()    -> u32 { 50 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { recent_limit: default_recent_limit(), default_page_size: default_page_size() }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| "inferscope.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path, e))?
        } else {
            tracing::info!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = set(BACKEND_URL_ENV) {
            self.backend.base_url = url;
        }
        if let Some(bind) = set(BIND_ENV) {
            self.server.bind = bind;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dashboard.recent_limit == 0 {
            anyhow::bail!("dashboard.recent_limit must be at least 1");
        }
        if !PAGE_SIZES.contains(&self.dashboard.default_page_size) {
            anyhow::bail!(
                "dashboard.default_page_size must be one of {:?}, got {}",
                PAGE_SIZES,
                self.dashboard.default_page_size
            );
        }
        Ok(())
    }
}
