use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::net::RoomCode;

/// Largest room code; `base_port` must leave room for it.
const MAX_ROOM_CODE: u16 = 9999;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Where the TCP transport listens and dials.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_host: String,
    pub peer_host: String,
    /// Room `code` is served on port `base_port + code`.
    pub base_port: u16,
    /// How long a host waits for a new guest to send its room code.
    pub hello_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_host: "0.0.0.0".to_string(),
            peer_host: "127.0.0.1".to_string(),
            base_port: 40_000,
            hello_timeout_ms: 5_000,
        }
    }
}

impl NetworkConfig {
    pub fn port_for(&self, code: RoomCode) -> u16 {
        self.base_port.saturating_add(code.value())
    }

    pub fn hello_timeout(&self) -> Duration {
        Duration::from_millis(self.hello_timeout_ms)
    }
}

/// Timers used by the session context.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub connect_timeout_secs: u64,
    pub notification_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            connect_timeout_secs: 10,
            notification_ms: 3_000,
        }
    }
}

impl SessionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: PathBuf::from("connect-four.log"),
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.base_port.checked_add(MAX_ROOM_CODE).is_none() {
            return Err(ConfigError::Validation(format!(
                "network.base_port must be <= {}",
                u16::MAX - MAX_ROOM_CODE
            )));
        }
        if self.network.bind_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network.bind_host must not be empty".into(),
            ));
        }
        if self.network.peer_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network.peer_host must not be empty".into(),
            ));
        }
        if self.network.hello_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "network.hello_timeout_ms must be > 0".into(),
            ));
        }
        if self.session.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "session.connect_timeout_secs must be > 0".into(),
            ));
        }
        if self.session.notification_ms == 0 {
            return Err(ConfigError::Validation(
                "session.notification_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
