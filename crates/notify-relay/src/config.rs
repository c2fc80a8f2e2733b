//! Relay configuration.
//!
//! Values are layered: built-in defaults, then the TOML config file, then
//! `NOTIFY_RELAY_*` environment variables (nested keys separated by `__`,
//! e.g. `NOTIFY_RELAY_CONNECTION__READ_TIMEOUT_MS=30000`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "notify-relay";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub connection: ConnectionConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Capacity of the hub's command channel.
    pub command_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_buffer: 1024,
        }
    }
}

/// Per-consumer limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Outbound frames buffered per consumer before it counts as too slow.
    pub send_buffer: usize,
    /// Largest inbound message accepted, in bytes.
    pub max_message_size: usize,
    /// A consumer that sends no pong within this window is dropped.
    pub read_timeout_ms: u64,
    /// Upper bound on a single batch write.
    pub write_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            send_buffer: 256,
            max_message_size: 512,
            read_timeout_ms: 60_000,
            write_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the relay, used by `notify-relay publish`.
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hub.command_buffer == 0 {
            bail!("hub.command_buffer must be at least 1");
        }
        let conn = &self.connection;
        if conn.send_buffer == 0 {
            bail!("connection.send_buffer must be at least 1");
        }
        if conn.max_message_size == 0 {
            bail!("connection.max_message_size must be at least 1");
        }
        if conn.read_timeout_ms < 10 {
            bail!("connection.read_timeout_ms must be at least 10");
        }
        if conn.write_timeout_ms == 0 {
            bail!("connection.write_timeout_ms must be at least 1");
        }
        if self.client.timeout_ms == 0 {
            bail!("client.timeout_ms must be at least 1");
        }
        Ok(())
    }
}

/// Runtime view of [`ConnectionConfig`] handed to every connection pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub send_buffer: usize,
    pub max_message_size: usize,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Keepalive period, always shorter than `read_timeout`.
    pub ping_interval: Duration,
}

/// Shortest keepalive period; a zero period would panic the tick timer.
const MIN_PING_INTERVAL: Duration = Duration::from_millis(1);

impl ConnectionSettings {
    pub fn new(read_timeout: Duration, write_timeout: Duration) -> Self {
        let defaults = ConnectionConfig::default();
        Self {
            send_buffer: defaults.send_buffer,
            max_message_size: defaults.max_message_size,
            read_timeout,
            write_timeout,
            ping_interval: (read_timeout * 9 / 10).max(MIN_PING_INTERVAL),
        }
    }
}

impl From<&ConnectionConfig> for ConnectionSettings {
    fn from(cfg: &ConnectionConfig) -> Self {
        Self {
            send_buffer: cfg.send_buffer,
            max_message_size: cfg.max_message_size,
            ..Self::new(
                Duration::from_millis(cfg.read_timeout_ms),
                Duration::from_millis(cfg.write_timeout_ms),
            )
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from(&ConnectionConfig::default())
    }
}

/// Load the configuration from `path` (optional) plus the environment.
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    let built = Config::builder()
        .set_default("logging.level", "info")?
        .add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::with_prefix(&env_prefix()).separator("__"))
        .build()
        .with_context(|| format!("reading config {}", path.display()))?;

    let config: RelayConfig = built
        .try_deserialize()
        .context("deserializing configuration")?;
    config.validate()?;
    Ok(config)
}

/// Write the default configuration to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let toml = toml::to_string_pretty(&RelayConfig::default())
        .context("serializing default config to TOML")?;
    let mut body = default_config_header(path);
    body.push_str(&toml);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

fn default_config_header(path: &Path) -> String {
    let mut buffer = String::new();
    buffer.push_str("# Configuration for ");
    buffer.push_str(APP_NAME);
    buffer.push('\n');
    buffer.push_str("# File: ");
    buffer.push_str(&path.display().to_string());
    buffer.push('\n');
    buffer.push_str("# Environment overrides: NOTIFY_RELAY_<SECTION>__<KEY>\n");
    buffer.push('\n');
    buffer
}

/// `notify-relay` becomes `NOTIFY_RELAY`.
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix(), "NOTIFY_RELAY");
    }

    #[test]
    fn test_ping_interval_is_nine_tenths_of_read_timeout() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.read_timeout, Duration::from_secs(60));
        assert_eq!(settings.ping_interval, Duration::from_secs(54));
        assert_eq!(settings.write_timeout, Duration::from_secs(10));
        assert_eq!(settings.send_buffer, 256);
        assert_eq!(settings.max_message_size, 512);
    }

    #[tokio::test]
    async fn test_zero_read_timeout_keeps_ping_interval_positive() {
        let settings = ConnectionSettings::new(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(settings.ping_interval, Duration::from_millis(1));

        let settings = ConnectionSettings::new(Duration::from_nanos(5), Duration::from_secs(1));
        assert!(!settings.ping_interval.is_zero());

        // The writer builds its tick timer from this period.
        let _ = tokio::time::interval(settings.ping_interval);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.connection.send_buffer, 256);
        assert!(config.server.cors_origins.is_empty());
    }

    #[test]
    fn test_default_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Configuration for notify-relay"));

        let config = load_config(&path).unwrap();
        assert_eq!(config.connection.read_timeout_ms, 60_000);
        assert_eq!(config.client.url, "http://localhost:8080");
    }

    #[test]
    fn test_partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 9000\ncors_origins = [\"http://localhost:3000\"]\n\n[connection]\nsend_buffer = 8\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.connection.send_buffer, 8);
        assert_eq!(config.connection.max_message_size, 512);
    }

    #[test]
    fn test_zero_send_buffer_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[connection]\nsend_buffer = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("send_buffer"));
    }
}
