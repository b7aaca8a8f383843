//! Command-line interface for wirelog.
//!
//! Run `wirelog` to start the monitor and dashboard API with sensible
//! defaults; flags and environment variables override the config file.

use crate::application::Application;
use crate::core::{Config, Result, WirelogError};
use clap::Parser;
use std::path::PathBuf;

/// Network request monitor with a live health dashboard
#[derive(Parser, Debug)]
#[command(name = "wirelog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// HTTP port for the dashboard API
    #[arg(long, env = "WIRELOG_HTTP_PORT")]
    pub http_port: Option<u16>,

    /// Retention capacity for the bounded log store
    #[arg(long, env = "WIRELOG_RETENTION")]
    pub retention: Option<usize>,

    /// Configuration file path (default: ~/.config/wirelog/config.yaml)
    #[arg(short, long, env = "WIRELOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory for the persisted log file
    #[arg(long, env = "WIRELOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep the store in memory only, skip persistence
    #[arg(long, env = "WIRELOG_NO_PERSIST")]
    pub no_persist: bool,

    /// Generate synthetic demo traffic
    #[arg(long, env = "WIRELOG_DEMO")]
    pub demo: bool,

    /// Enable debug logging
    #[arg(short, long, env = "WIRELOG_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        use crate::core::config::ConfigBuilder;

        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            let default_path = dirs::config_dir()
                .map(|d| d.join("wirelog").join("config.yaml"))
                .unwrap_or_else(|| PathBuf::from("~/.config/wirelog/config.yaml"));

            if default_path.exists() {
                default_path
            } else {
                return self.build_config_from_args(builder);
            }
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                tracing::info!("Loaded configuration from: {:?}", config_path);
            },
            Err(e) if self.config.is_some() => {
                return Err(WirelogError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {
                tracing::debug!("No config file found at {:?}, using defaults", config_path);
            },
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(
        &self,
        mut builder: crate::core::config::ConfigBuilder,
    ) -> Result<Config> {
        if let Some(port) = self.http_port {
            builder = builder.http_port(port);
        }
        if let Some(retention) = self.retention {
            builder = builder.retention_capacity(retention);
        }
        if let Some(dir) = &self.data_dir {
            builder = builder.data_dir(dir.clone());
        }
        if self.no_persist {
            builder = builder.persistent(false);
        }
        if self.demo {
            builder = builder.demo(true);
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let env_log_level = std::env::var("WIRELOG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_level = if self.debug {
            "debug"
        } else {
            env_log_level.as_str()
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| WirelogError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Run the CLI to completion.
pub async fn execute(cli: Cli) -> Result<()> {
    cli.init_logging()?;
    let config = cli.load_config().await?;

    if cli.check_config {
        println!("Configuration OK");
        return Ok(());
    }

    let app = Application::new(config).await?;
    if let Some(path) = cli.config.clone() {
        app.watch_config(path);
    }
    app.run().await
}
