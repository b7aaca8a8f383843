//! Bounded log storage.
//!
//! The [`LogStore`] keeps finalized log entries newest-first, enforces
//! the configured retention capacity on every insert, persists the full
//! state through a [`PersistenceBackend`], and pushes change
//! notifications carrying the complete new collection.

pub mod persist;

pub use persist::{JsonFileBackend, MemoryBackend, PersistedState, PersistenceBackend};

use crate::core::{LogEntry, RETENTION_FLOOR};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

struct StoreInner {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl StoreInner {
    fn snapshot(&self) -> PersistedState {
        PersistedState {
            network_logs: self.entries.iter().cloned().collect(),
            retention_capacity: self.capacity,
        }
    }
}

/// Capacity-bounded, newest-first collection of finalized log entries.
///
/// All mutation happens under a single write lock, so readers never
/// observe a collection mid-truncation. Persistence and change
/// notification happen after the lock is released; persistence is
/// asynchronous but ordered (a single writer task drains a queue).
pub struct LogStore {
    inner: RwLock<StoreInner>,
    changes: watch::Sender<Vec<LogEntry>>,
    persist_tx: Option<mpsc::UnboundedSender<PersistedState>>,
}

impl LogStore {
    /// Create an in-memory store with the given retention capacity.
    /// The capacity is clamped to the floor.
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            inner: RwLock::new(StoreInner {
                entries: VecDeque::new(),
                capacity: capacity.max(RETENTION_FLOOR),
            }),
            changes,
            persist_tx: None,
        }
    }

    /// Create a store that persists through the given backend.
    ///
    /// Spawns the writer task, so this must be called from within a
    /// tokio runtime.
    pub fn with_persistence(capacity: usize, backend: Arc<dyn PersistenceBackend>) -> Self {
        let mut store = Self::new(capacity);
        store.persist_tx = Some(spawn_writer(backend));
        store
    }

    /// Restore a store from persisted state, falling back to an empty
    /// store when nothing was persisted or the medium is unreadable.
    /// A read failure is logged, never fatal.
    pub async fn restore(backend: Arc<dyn PersistenceBackend>, fallback_capacity: usize) -> Self {
        let state = match backend.load().await {
            Ok(Some(state)) => state,
            Ok(None) => PersistedState {
                network_logs: Vec::new(),
                retention_capacity: fallback_capacity,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to load persisted logs, starting empty");
                PersistedState {
                    network_logs: Vec::new(),
                    retention_capacity: fallback_capacity,
                }
            },
        };

        let store = Self::with_persistence(state.retention_capacity, backend);
        {
            let mut inner = store.inner.write();
            let capacity = inner.capacity;
            inner.entries = state.network_logs.into_iter().take(capacity).collect();
        }
        store.changes.send_replace(store.get_all());
        store
    }

    /// Insert a finalized entry at the head, evicting past capacity.
    pub fn insert(&self, entry: LogEntry) {
        let state = {
            let mut inner = self.inner.write();
            inner.entries.push_front(entry);
            let capacity = inner.capacity;
            inner.entries.truncate(capacity);
            inner.snapshot()
        };
        self.publish(state);
    }

    /// Returns the current ordered collection, newest first.
    pub fn get_all(&self) -> Vec<LogEntry> {
        self.inner.read().entries.iter().cloned().collect()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Current retention capacity.
    pub fn retention_capacity(&self) -> usize {
        self.inner.read().capacity
    }

    /// Empty the collection, persist, and notify.
    pub fn clear(&self) {
        let state = {
            let mut inner = self.inner.write();
            inner.entries.clear();
            inner.snapshot()
        };
        self.publish(state);
    }

    /// Set the retention capacity, clamped to the floor, truncating
    /// existing contents immediately. Returns the effective capacity.
    pub fn set_retention_capacity(&self, capacity: usize) -> usize {
        let (effective, state) = {
            let mut inner = self.inner.write();
            inner.capacity = capacity.max(RETENTION_FLOOR);
            let capacity = inner.capacity;
            inner.entries.truncate(capacity);
            (capacity, inner.snapshot())
        };
        self.publish(state);
        effective
    }

    /// Subscribe to change notifications. Each notification carries the
    /// complete new collection, not a diff.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LogEntry>> {
        self.changes.subscribe()
    }

    fn publish(&self, state: PersistedState) {
        self.changes.send_replace(state.network_logs.clone());
        if let Some(tx) = &self.persist_tx {
            if tx.send(state).is_err() {
                tracing::debug!("persistence writer gone, skipping save");
            }
        }
    }
}

/// Single writer task: drains snapshots in issue order, logs failures.
/// A failed save never propagates to the mutation that triggered it.
fn spawn_writer(backend: Arc<dyn PersistenceBackend>) -> mpsc::UnboundedSender<PersistedState> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PersistedState>();
    tokio::spawn(async move {
        while let Some(state) = rx.recv().await {
            if let Err(e) = backend.save(&state).await {
                tracing::error!(error = %e, "failed to persist network logs");
            }
        }
    });
    tx
}
