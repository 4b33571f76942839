//! Global bizdash configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{BizdashError, BizdashResult};

static DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
static DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Configuration at ~/.config/bizdash/config.toml
///
/// Every key can be overridden with a `BIZDASH_`-prefixed environment
/// variable, e.g. `BIZDASH_TOKEN`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BizdashConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token issued by the dashboard's session provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BizdashConfig {
    fn default() -> Self {
        BizdashConfig {
            api_url: default_api_url(),
            token: None,
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BizdashConfig {
    pub fn config_path() -> BizdashResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BizdashError::Config("Could not determine config directory".into()))?
            .join("bizdash");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first use),
    /// then apply environment overrides.
    pub fn load() -> BizdashResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load only what is stored in the config file at the default location.
    /// Use this before [`BizdashConfig::save`] so environment overrides are
    /// never persisted.
    pub fn load_file() -> BizdashResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_file_only(&config_path)
    }

    /// File values overlaid with `BIZDASH_*` environment variables.
    pub fn load_from(path: &Path) -> BizdashResult<Self> {
        Self::build(path, true)
    }

    pub fn load_file_only(path: &Path) -> BizdashResult<Self> {
        Self::build(path, false)
    }

    fn build(path: &Path, with_env: bool) -> BizdashResult<Self> {
        let mut builder = Config::builder().add_source(File::from(path).required(false));
        if with_env {
            builder = builder.add_source(Environment::with_prefix("BIZDASH"));
        }

        builder
            .build()
            .map_err(|e| BizdashError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| BizdashError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Save the current config to its default location.
    pub fn save(&self) -> BizdashResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> BizdashResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| BizdashError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| BizdashError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> BizdashResult<()> {
        let contents = format!(
            "\
# bizdash configuration

# Dashboard API base URL:
# api_url = \"{}\"

# Bearer token from your dashboard session (or set BIZDASH_TOKEN):
# token = \"...\"

# Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
# log_level = \"{}\"

# Per-request timeout in seconds:
# request_timeout_secs = {}
",
            DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BizdashError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| BizdashError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
