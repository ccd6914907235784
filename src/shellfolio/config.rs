use crate::error::{Result, ShellError};
use crate::rate_limit::RateLimitProfile;
use crate::security::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_PAGE_SIZE: usize = 5;
const DEFAULT_SWEEP_SECS: u64 = 5 * 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// Engine configuration, stored in `<config dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellConfig {
    /// Limits for non-command routes
    #[serde(default = "RateLimitProfile::api")]
    pub api_rate_limit: RateLimitProfile,

    /// Limits for command execution
    #[serde(default = "RateLimitProfile::terminal")]
    pub terminal_rate_limit: RateLimitProfile,

    #[serde(default = "default_sweep_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_security_capacity")]
    pub security_log_capacity: usize,

    /// Page size for listings when `--per` is not given
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Name exposed to templates as `{{user}}`
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_use_color")]
    pub use_color: bool,

    /// Catalog JSON file; the embedded catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Project JSON file; the listing is empty when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_path: Option<PathBuf>,
}

fn default_sweep_secs() -> u64 {
    DEFAULT_SWEEP_SECS
}

fn default_security_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_store_timeout_ms() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

fn default_user() -> String {
    "guest".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_use_color() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_rate_limit: RateLimitProfile::api(),
            terminal_rate_limit: RateLimitProfile::terminal(),
            sweep_interval_secs: default_sweep_secs(),
            security_log_capacity: default_security_capacity(),
            default_page_size: default_page_size(),
            store_timeout_ms: default_store_timeout_ms(),
            user: default_user(),
            timezone: default_timezone(),
            use_color: default_use_color(),
            catalog_path: None,
            projects_path: None,
        }
    }
}

impl ShellConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ShellError::Io)?;
        let config: ShellConfig =
            serde_json::from_str(&content).map_err(ShellError::Serialization)?;
        Ok(config.resolve_paths(config_dir.as_ref()))
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ShellError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ShellError::Serialization)?;
        fs::write(config_path, content).map_err(ShellError::Io)?;
        Ok(())
    }

    /// Relative data paths are taken relative to the config directory.
    fn resolve_paths(mut self, config_dir: &Path) -> Self {
        for path in [&mut self.catalog_path, &mut self.projects_path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = config_dir.join(&*path);
            }
        }
        self
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}
