//! Persistence backends for the log store.
//!
//! The store treats durability as best-effort: a failed write is logged
//! and the in-memory collection stays authoritative for the session.

use crate::core::{LogEntry, Result, WirelogError, DEFAULT_RETENTION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// The full persisted state of a log store: the bounded entry list and
/// the retention setting. Key names match the dashboard's storage layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Ordered log entries, newest first
    #[serde(rename = "networkLogs", default)]
    pub network_logs: Vec<LogEntry>,
    /// Configured retention capacity
    #[serde(rename = "retentionCapacity", default = "default_retention")]
    pub retention_capacity: usize,
}

fn default_retention() -> usize {
    DEFAULT_RETENTION
}

impl Default for PersistedState {
    fn default() -> Self {
        PersistedState {
            network_logs: Vec::new(),
            retention_capacity: DEFAULT_RETENTION,
        }
    }
}

/// Trait for log store persistence implementations.
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Load the persisted state. `Ok(None)` means nothing was persisted yet.
    async fn load(&self) -> Result<Option<PersistedState>>;

    /// Persist the full state, replacing any previous snapshot.
    async fn save(&self, state: &PersistedState) -> Result<()>;
}

/// JSON-file persistence under a data directory.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend writing to `<data_dir>/logs.json`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("logs.json"),
        }
    }

    /// Returns the path of the persisted file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<PersistedState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(WirelogError::storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            },
        };
        let state = serde_json::from_str(&content).map_err(|e| {
            WirelogError::storage(format!("failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(Some(state))
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                WirelogError::storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let content = serde_json::to_vec_pretty(state)?;
        // Write-then-rename keeps a half-written file from clobbering
        // the previous good snapshot.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &content).await.map_err(|e| {
            WirelogError::storage(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            WirelogError::storage(format!("failed to rename {}: {}", tmp.display(), e))
        })?;
        Ok(())
    }
}

/// In-memory persistence, for tests and ephemeral runs.
pub struct MemoryBackend {
    state: parking_lot::Mutex<Option<PersistedState>>,
    fail_saves: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self {
            state: parking_lot::Mutex::new(None),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Create a backend whose saves always fail. Loads still succeed:
    /// this models a medium that went read-only mid-session.
    pub fn with_failing_saves() -> Self {
        Self {
            state: parking_lot::Mutex::new(None),
            fail_saves: AtomicBool::new(true),
        }
    }

    /// Returns the most recently saved state, if any.
    pub fn saved(&self) -> Option<PersistedState> {
        self.state.lock().clone()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<PersistedState>> {
        Ok(self.state.lock().clone())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(WirelogError::storage("persistence medium unavailable"));
        }
        *self.state.lock() = Some(state.clone());
        Ok(())
    }
}
