//! Callboard Configuration
//!
//! Config is stored in `~/.config/callboard/config.yaml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. CLI flags (`--server`, `--show-unknown`)
//! 2. Environment variables (`CALLBOARD_SERVER`, `CALLBOARD_LOG`)
//! 3. Config file
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::controller::ControllerSettings;
use crate::endpoint::{websocket_url, DEFAULT_WS_PATH};
use crate::error::{DisplayError, Result};

pub const ENV_SERVER: &str = "CALLBOARD_SERVER";
pub const ENV_LOG: &str = "CALLBOARD_LOG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub server: ServerConfig,
    pub timing: TimingConfig,
    pub display: DisplaySection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the display server (http, https, ws or wss)
    pub url: String,
    /// Socket path on that server
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8001".to_string(),
            path: DEFAULT_WS_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub reconnect_delay_ms: u64,
    pub idle_timeout_secs: u64,
    pub connected_banner_secs: u64,
    pub call_banner_secs: u64,
    pub transition_ms: u64,
    pub frame_rate: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 5_000,
            idle_timeout_secs: 300,
            connected_banner_secs: 5,
            call_banner_secs: 30,
            transition_ms: 500,
            frame_rate: 30,
        }
    }
}

/// What to do with message types the display does not know
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Log and drop
    #[default]
    Ignore,
    /// Replace the slot with a raw JSON view
    ShowRaw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySection {
    pub unknown_types: UnknownTypePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; the terminal belongs to the display
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl DisplayConfig {
    /// Returns `~/.config/callboard/` on Unix, `%APPDATA%/callboard/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("callboard")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load from the default location; defaults if the file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DisplayError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| DisplayError::Config {
            reason: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Merge with a custom variable lookup (tests avoid touching the process env)
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(server) = lookup(ENV_SERVER).filter(|s| !s.trim().is_empty()) {
            self.server.url = server.trim().to_string();
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|s| !s.trim().is_empty()) {
            self.logging.filter = filter.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timing.frame_rate == 0 {
            return Err(DisplayError::Config {
                reason: "timing.frame_rate must be at least 1".to_string(),
            });
        }
        self.endpoint().map(|_| ())
    }

    pub fn endpoint(&self) -> Result<Url> {
        websocket_url(&self.server.url, &self.server.path)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.timing.frame_rate.max(1)))
    }

    /// Configured log file, else `<data dir>/callboard/callboard.log`
    pub fn log_file(&self) -> PathBuf {
        self.logging.file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("callboard")
                .join("callboard.log")
        })
    }

    pub fn controller_settings(&self) -> Result<ControllerSettings> {
        let timing = &self.timing;
        Ok(ControllerSettings {
            endpoint: self.endpoint()?,
            reconnect_delay: Duration::from_millis(timing.reconnect_delay_ms),
            idle_timeout: Duration::from_secs(timing.idle_timeout_secs),
            transition: Duration::from_millis(timing.transition_ms),
            connection_banner: Duration::from_secs(timing.connected_banner_secs),
            call_banner: Duration::from_secs(timing.call_banner_secs),
            unknown_types: self.display.unknown_types,
        })
    }
}
