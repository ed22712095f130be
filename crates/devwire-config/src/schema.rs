//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the DevTools peer lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// HTTP discovery endpoint (`/json/version` is fetched from here).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Browser WebSocket URL. When set, discovery is skipped.
    #[serde(default)]
    pub ws_url: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            ws_url: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

/// Caller-side client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-command timeout applied by the CLI. `0` waits forever.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl ClientConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_command_timeout() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Also write logs to daily rotated files.
    #[serde(default)]
    pub file: bool,

    /// Log file directory. Defaults to `~/.devwire/logs`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| devwire_dir().join("logs"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: false,
            directory: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Get the ~/.devwire directory path.
pub fn devwire_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".devwire"))
        .unwrap_or_else(|| PathBuf::from(".devwire"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.connection.endpoint, "http://127.0.0.1:9222");
        assert!(config.connection.ws_url.is_none());
        assert_eq!(config.client.command_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.file);
    }

    #[test]
    fn test_command_timeout_zero_disables() {
        let client = ClientConfig {
            command_timeout_secs: 0,
        };
        assert!(client.command_timeout().is_none());
        assert_eq!(
            ClientConfig::default().command_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_log_dir_override() {
        let logging = LoggingConfig {
            directory: Some(PathBuf::from("/var/log/devwire")),
            ..Default::default()
        };
        assert_eq!(logging.log_dir(), PathBuf::from("/var/log/devwire"));
        assert!(LoggingConfig::default().log_dir().ends_with("logs"));
    }
}
