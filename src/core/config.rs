//! Configuration management for wirelog.
//!
//! Handles YAML config files, environment variable overrides, CLI
//! overrides, validation, and live reload of the retention setting.

use crate::core::{Result, WirelogError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Hard floor for the retention capacity. Values below this are
/// silently clamped, never rejected.
pub const RETENTION_FLOOR: usize = 10;

/// Default number of log entries kept in the bounded store.
pub const DEFAULT_RETENTION: usize = 100;

/// Complete configuration for wirelog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API server configuration
    pub server: ServerConfig,
    /// Log store configuration
    pub storage: StorageConfig,
    /// Signal monitor configuration
    pub monitor: MonitorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port for the dashboard API
    pub http_port: u16,
    /// Bind address for the API server
    pub bind_address: IpAddr,
    /// Enable permissive CORS headers for browser dashboards
    pub enable_cors: bool,
}

/// Log store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Maximum number of log entries to retain (floor: 10)
    pub retention_capacity: usize,
    /// Persist the store to disk between runs
    pub persistent: bool,
    /// Data directory for the persisted log file
    pub data_dir: PathBuf,
}

/// Signal monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Evict pending request starts older than this (bounds the leak
    /// from starts that never get a terminal signal)
    #[serde(with = "humantime_serde")]
    pub stale_after: Duration,
    /// Inbound signal channel capacity
    pub signal_buffer: usize,
    /// Generate synthetic demo traffic when no host layer is attached
    pub demo: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

/// Log levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            monitor: MonitorConfig::default(),
            logging: LoggingConfig::default(),
            debug: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 8080,
            bind_address: "0.0.0.0".parse().expect("Valid default IP address"),
            enable_cors: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            retention_capacity: DEFAULT_RETENTION,
            persistent: true,
            data_dir: dirs::data_dir()
                .map(|d| d.join("wirelog"))
                .unwrap_or_else(|| PathBuf::from("./wirelog_data")),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            stale_after: Duration::from_secs(300),
            signal_buffer: 1024,
            demo: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let mut config = Config::default();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Clamp out-of-range values that are tolerated rather than rejected.
    ///
    /// A retention capacity below the floor is a configuration anomaly,
    /// not an error: it is raised to the floor and the process keeps going.
    pub fn normalize(&mut self) {
        if self.storage.retention_capacity < RETENTION_FLOOR {
            tracing::warn!(
                requested = self.storage.retention_capacity,
                floor = RETENTION_FLOOR,
                "retention capacity below floor, clamping"
            );
            self.storage.retention_capacity = RETENTION_FLOOR;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.monitor.signal_buffer == 0 {
            return Err(WirelogError::config("signal_buffer must be greater than 0"));
        }
        if self.monitor.stale_after.is_zero() {
            return Err(WirelogError::config("stale_after must be greater than 0"));
        }
        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| WirelogError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set HTTP API port
    pub fn http_port(mut self, port: u16) -> Self {
        self.config.server.http_port = port;
        self
    }

    /// Set retention capacity (clamped to the floor on build)
    pub fn retention_capacity(mut self, capacity: usize) -> Self {
        self.config.storage.retention_capacity = capacity;
        self
    }

    /// Enable persistent storage
    pub fn persistent(mut self, enable: bool) -> Self {
        self.config.storage.persistent = enable;
        self
    }

    /// Set data directory
    pub fn data_dir(mut self, path: PathBuf) -> Self {
        self.config.storage.data_dir = path;
        self
    }

    /// Enable synthetic demo traffic
    pub fn demo(mut self, enable: bool) -> Self {
        self.config.monitor.demo = enable;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;
        config.normalize();
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch a configuration file for changes.
///
/// Reloaded configs are published on a watch channel; the application
/// applies the retention setting to the live store.
pub struct ConfigWatcher {
    path: PathBuf,
    tx: tokio::sync::watch::Sender<Config>,
    rx: tokio::sync::watch::Receiver<Config>,
}

impl ConfigWatcher {
    /// Create a new configuration watcher
    pub fn new(path: PathBuf, initial: Config) -> Self {
        let (tx, rx) = tokio::sync::watch::channel(initial);
        ConfigWatcher { path, tx, rx }
    }

    /// Get a receiver for configuration updates
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Config> {
        self.rx.clone()
    }

    /// Start watching for configuration changes
    pub async fn watch(self) -> Result<()> {
        use notify::{RecursiveMode, Watcher};
        use std::sync::mpsc::channel;

        let (tx, rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        })
        .map_err(|e| WirelogError::config(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| WirelogError::config(format!("Failed to watch config file: {}", e)))?;

        tracing::info!("Watching configuration file: {:?}", self.path);

        while let Ok(event) = rx.recv() {
            if matches!(event.kind, notify::EventKind::Modify(_)) {
                tracing::info!("Configuration file changed, reloading...");

                match tokio::fs::read_to_string(&self.path).await {
                    Ok(content) => match serde_yaml::from_str::<Config>(&content) {
                        Ok(mut new_config) => {
                            new_config.normalize();
                            if let Err(e) = new_config.validate() {
                                tracing::error!("Invalid configuration: {}", e);
                                continue;
                            }

                            // Preserve runtime-only settings
                            new_config.debug = self.tx.borrow().debug;

                            if let Err(e) = self.tx.send(new_config) {
                                tracing::error!("Failed to update configuration: {}", e);
                            }

                            tracing::info!("Configuration reloaded successfully");
                        },
                        Err(e) => {
                            tracing::error!("Failed to parse configuration: {}", e);
                        },
                    },
                    Err(e) => {
                        tracing::error!("Failed to read configuration file: {}", e);
                    },
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.retention_capacity, DEFAULT_RETENTION);
    }

    #[test]
    fn test_retention_below_floor_is_clamped_not_rejected() {
        let config = ConfigBuilder::new().retention_capacity(3).build().unwrap();
        assert_eq!(config.storage.retention_capacity, RETENTION_FLOOR);
    }

    #[test]
    fn test_zero_signal_buffer_rejected() {
        let mut config = Config::default();
        config.monitor.signal_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .http_port(9090)
            .retention_capacity(250)
            .persistent(false)
            .demo(true)
            .debug(true)
            .build()
            .unwrap();

        assert_eq!(config.server.http_port, 9090);
        assert_eq!(config.storage.retention_capacity, 250);
        assert!(!config.storage.persistent);
        assert!(config.monitor.demo);
        assert!(config.debug);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
server:
  bind_address: "127.0.0.1"
  http_port: 5080
  enable_cors: false
storage:
  retention_capacity: 500
  persistent: false
  data_dir: "/tmp/wirelog"
monitor:
  stale_after: 2m
  signal_buffer: 64
  demo: false
"#;

        let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();
        assert_eq!(config.server.http_port, 5080);
        assert!(!config.server.enable_cors);
        assert_eq!(config.storage.retention_capacity, 500);
        assert_eq!(config.monitor.stale_after, Duration::from_secs(120));
        assert_eq!(config.monitor.signal_buffer, 64);
    }
}
