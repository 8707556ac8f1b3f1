use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(super) const CONFIG_DIR_NAME: &str = ".rednote";
pub(super) const CONFIG_FILE_NAME: &str = "config.toml";
const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// How the session token is placed in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthStyle {
    /// `Authorization: <token>`
    #[default]
    Raw,
    /// `Authorization: Bearer <token>`
    Bearer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gateway base URL including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub auth_style: AuthStyle,
}

fn default_base_url() -> String {
    "http://10.21.32.95:30618/api".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            auth_style: AuthStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_comment_page_size")]
    pub comment_page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn default_comment_page_size() -> u32 {
    20
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            comment_page_size: default_comment_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the durable storage file; `~` is expanded
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub(super) fn rednote_dir() -> PathBuf {
    let home = UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
    home.join(CONFIG_DIR_NAME)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: rednote_dir().join(CONFIG_FILE_NAME),
            api: ApiConfig::default(),
            feed: FeedConfig::default(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Resolved location of the durable key/value file.
    pub fn storage_path(&self) -> PathBuf {
        match self.storage.path.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
            }
            _ => self
                .config_path
                .parent()
                .map_or_else(rednote_dir, std::path::Path::to_path_buf)
                .join(STORAGE_FILE_NAME),
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        match self.log.level.trim().to_ascii_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation("api.base_url must not be empty".into()));
        }
        let parsed = url::Url::parse(base_url).map_err(|error| {
            ConfigError::Validation(format!("api.base_url is not a valid URL: {error}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "api.base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation("api.timeout_secs must be > 0".into()));
        }
        if self.feed.page_size == 0 || self.feed.comment_page_size == 0 {
            return Err(ConfigError::Validation("feed page sizes must be > 0".into()));
        }
        Ok(())
    }
}
