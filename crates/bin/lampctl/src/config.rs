//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `lampctl.toml` in the working directory (or the file named by
//! `LAMPCTL_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use lampctl_adapter_lifx::LifxConfig;
use lampctl_adapter_virtual::VirtualConfig;
use lampctl_app::orchestrator::Orchestrator;
use lampctl_app::query::QueryPolicy;
use lampctl_domain::tuning::Tuning;

const DEFAULT_PATH: &str = "lampctl.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dimming step and power-off threshold.
    pub tuning: Tuning,
    /// Run timing.
    pub run: RunConfig,
    /// Which transport talks to the lights.
    pub transport: TransportConfig,
    /// LIFX LAN settings.
    pub lifx: LifxConfig,
    /// Simulated bulbs.
    #[serde(rename = "virtual")]
    pub virtual_bulbs: VirtualConfig,
    /// Snapshot file settings.
    pub storage: StorageConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Idle detection and state query timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// A run ends after two idle intervals without discovery activity.
    pub idle_interval_ms: u64,
    /// How long one state request waits for its answer.
    pub query_timeout_ms: u64,
    /// How many times an unanswered state request is re-sent.
    pub query_max_retries: u32,
}

/// Transport selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: TransportKind,
}

/// The transports lampctl can drive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Lifx,
    Virtual,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lifx" => Ok(Self::Lifx),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown transport `{other}`"
            ))),
        }
    }
}

/// Snapshot file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON snapshot file.
    pub path: PathBuf,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Directory served at `/`, if any.
    pub static_dir: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `lampctl.toml` (or `LAMPCTL_CONFIG`), then
    /// apply environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, if an
    /// override cannot be parsed, or if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("LAMPCTL_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("LAMPCTL_TRANSPORT") {
            self.transport.kind = val.parse()?;
        }
        if let Some(val) = var("LAMPCTL_STORAGE") {
            self.storage.path = PathBuf::from(val);
        }
        if let Some(val) = var("LAMPCTL_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("LAMPCTL_PORT") {
            self.server.port = parse_port(&val)?;
        }
        if let Some(val) = var("LAMPCTL_BIND") {
            let (host, port) = val.rsplit_once(':').ok_or_else(|| {
                ConfigError::Validation(format!("bind address `{val}` must be host:port"))
            })?;
            self.server.host = host.to_string();
            self.server.port = parse_port(port)?;
        }
        if let Some(val) = var("LAMPCTL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.run.idle_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "idle interval must be non-zero".to_string(),
            ));
        }
        if self.run.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query timeout must be non-zero".to_string(),
            ));
        }
        if self.tuning.illumination_step_size == 0 {
            return Err(ConfigError::Validation(
                "illumination step size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl RunConfig {
    #[must_use]
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(Duration::from_millis(self.idle_interval_ms))
    }

    #[must_use]
    pub fn query_policy(&self) -> QueryPolicy {
        QueryPolicy {
            timeout: Duration::from_millis(self.query_timeout_ms),
            max_retries: self.query_max_retries,
        }
    }
}

fn parse_port(val: &str) -> Result<u16, ConfigError> {
    val.parse()
        .map_err(|_| ConfigError::Validation(format!("invalid port `{val}`")))
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: 4000,
            query_timeout_ms: 5000,
            query_max_retries: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("config.json"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lampctl=info,lampd=info,lampctl_app=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.path, PathBuf::from("config.json"));
        assert_eq!(config.transport.kind, TransportKind::Lifx);
        assert_eq!(config.tuning.illumination_step_size, 255);
        assert_eq!(config.tuning.turn_off_level, 511);
        assert_eq!(config.run.query_policy(), QueryPolicy::default());
        assert_eq!(config.run.orchestrator().idle_interval(), Duration::from_secs(4));
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [tuning]
            illumination_step_size = 100
            turn_off_level = 300

            [run]
            idle_interval_ms = 2000
            query_timeout_ms = 1000
            query_max_retries = 2

            [transport]
            kind = 'virtual'

            [lifx]
            broadcast = '192.168.1.255:56700'

            [[virtual.bulbs]]
            label = 'Kitchen'
            power = 'on'

            [[virtual.bulbs]]
            label = 'Hall'
            ignore_requests = 1

            [storage]
            path = '/var/lib/lampctl/config.json'

            [server]
            host = '127.0.0.1'
            port = 9090
            static_dir = 'website'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.tuning.illumination_step_size, 100);
        assert_eq!(config.tuning.turn_off_level, 300);
        assert_eq!(
            config.run.query_policy(),
            QueryPolicy {
                timeout: Duration::from_secs(1),
                max_retries: 2
            }
        );
        assert_eq!(config.transport.kind, TransportKind::Virtual);
        assert_eq!(config.lifx.broadcast.to_string(), "192.168.1.255:56700");
        assert_eq!(config.virtual_bulbs.bulbs.len(), 2);
        assert_eq!(config.virtual_bulbs.bulbs[1].ignore_requests, 1);
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/lampctl/config.json"));
        assert_eq!(config.server.static_dir, Some(PathBuf::from("website")));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lampctl.toml");
        std::fs::write(&path, "invalid {{{").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("LAMPCTL_TRANSPORT", "Virtual"),
                ("LAMPCTL_STORAGE", "/tmp/states.json"),
                ("LAMPCTL_BIND", "127.0.0.1:8080"),
                ("LAMPCTL_LOG", "warn"),
            ]))
            .unwrap();
        assert_eq!(config.transport.kind, TransportKind::Virtual);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/states.json"));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_lampctl_log() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("LAMPCTL_LOG", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_unknown_transport_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(env(&[("LAMPCTL_TRANSPORT", "zigbee")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: unknown transport `zigbee`");
    }

    #[test]
    fn should_reject_invalid_port_override() {
        let mut config = Config::default();
        assert!(
            config
                .apply_overrides(env(&[("LAMPCTL_PORT", "http")]))
                .is_err()
        );
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_timings() {
        let mut config = Config::default();
        config.run.idle_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.run.query_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_step_size() {
        let mut config = Config::default();
        config.tuning.illumination_step_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
