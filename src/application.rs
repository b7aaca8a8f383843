//! Main application entry point for wirelog.

use crate::api::{self, ApiConfig};
use crate::core::{Config, ConfigWatcher, RequestSignal, Result, WirelogError};
use crate::ingest::{Monitor, SampleGenerator, SignalSender};
use crate::storage::{JsonFileBackend, LogStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Demo traffic rate in requests per second.
const DEMO_RPS: f64 = 4.0;

/// Coordinates the monitor, store, and API server.
pub struct Application {
    config: Config,
    store: Arc<LogStore>,
    monitor: Arc<Monitor>,
    generator: Arc<SampleGenerator>,
    signal_tx: SignalSender,
    signal_rx: Option<mpsc::Receiver<RequestSignal>>,
}

impl Application {
    /// Create a new Application with the given configuration.
    ///
    /// Restores the persisted store when persistence is enabled; a
    /// persisted retention setting wins over the configured default,
    /// since it reflects the last live adjustment.
    pub async fn new(config: Config) -> Result<Self> {
        let store = if config.storage.persistent {
            let backend = Arc::new(JsonFileBackend::new(config.storage.data_dir.clone()));
            Arc::new(LogStore::restore(backend, config.storage.retention_capacity).await)
        } else {
            Arc::new(LogStore::new(config.storage.retention_capacity))
        };

        let monitor = Arc::new(Monitor::new(Arc::clone(&store), config.monitor.stale_after));
        let (signal_tx, signal_rx) = mpsc::channel(config.monitor.signal_buffer);

        Ok(Self {
            config,
            store,
            monitor,
            generator: Arc::new(SampleGenerator::new()),
            signal_tx,
            signal_rx: Some(signal_rx),
        })
    }

    /// Handle host layers clone to feed request signals into the engine.
    pub fn signal_sender(&self) -> SignalSender {
        self.signal_tx.clone()
    }

    /// Get a reference to the log store.
    pub fn store(&self) -> &Arc<LogStore> {
        &self.store
    }

    /// Apply live retention changes from a watched config file.
    pub fn watch_config(&self, path: PathBuf) {
        let watcher = ConfigWatcher::new(path, self.config.clone());
        let mut updates = watcher.subscribe();
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            if let Err(e) = watcher.watch().await {
                tracing::error!("config watcher stopped: {}", e);
            }
        });
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let requested = updates.borrow().storage.retention_capacity;
                let effective = store.set_retention_capacity(requested);
                tracing::info!(capacity = effective, "applied retention from config reload");
            }
        });
    }

    /// Run the application: monitor task, optional demo traffic, and
    /// the API server in the foreground until ctrl-c.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("Starting wirelog");

        let signal_rx = self.signal_rx.take().ok_or(WirelogError::ChannelSend)?;
        let monitor = Arc::clone(&self.monitor);
        tokio::spawn(monitor.run(signal_rx));

        if self.config.monitor.demo {
            tracing::info!("demo mode: generating synthetic traffic");
            let generator = Arc::clone(&self.generator);
            let tx = self.signal_tx.clone();
            tokio::spawn(async move {
                generator.run(tx, DEMO_RPS).await;
            });
        }

        let api_config = ApiConfig {
            port: self.config.server.http_port,
            bind_address: self.config.server.bind_address,
            enable_cors: self.config.server.enable_cors,
            ..ApiConfig::default()
        };
        let server = api::start_server(
            Arc::clone(&self.store),
            Arc::clone(&self.generator),
            api_config,
        );

        tokio::select! {
            result = server => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                Ok(())
            }
        }
    }
}
