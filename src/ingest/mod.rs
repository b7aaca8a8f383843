//! Signal ingestion: correlating raw request signals into log entries.
//!
//! The host networking layer emits [`RequestSignal`]s over a channel;
//! the [`Monitor`] pairs each start with its terminal signal through
//! the [`CorrelationTable`], derives a finalized [`LogEntry`], and
//! inserts it into the store. The core never sees the concrete
//! delivery mechanism, only the channel.

pub mod synthetic;

pub use synthetic::SampleGenerator;

use crate::core::{
    now_unix_millis, LogEntry, RequestId, RequestOutcome, RequestSignal, UnixMillis,
};
use crate::storage::LogStore;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Sending half of the inbound signal channel, cloned into host layers.
pub type SignalSender = mpsc::Sender<RequestSignal>;

/// Tracks in-flight requests by id and pairs starts with terminals.
///
/// Keying by request id is what makes interleaved in-flight requests
/// safe: each id's lifecycle is independent, no cross-id locking.
pub struct CorrelationTable {
    pending: DashMap<RequestId, UnixMillis>,
}

impl CorrelationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Record a pending start time for `id`.
    ///
    /// A repeated start for an in-flight id replaces the old timer.
    /// That is a tolerated anomaly from the host layer, not an error.
    pub fn record_start(&self, id: RequestId, started_at_ms: Option<UnixMillis>) {
        let started_at = started_at_ms.unwrap_or_else(now_unix_millis);
        if self.pending.insert(id, started_at).is_some() {
            tracing::debug!("duplicate start signal, timer reset");
        }
    }

    /// Consume the pending entry for `id` and produce a finalized entry.
    ///
    /// Always removes the pending entry, whether or not one existed, and
    /// always yields an entry: an unmatched terminal is a normal edge
    /// case (e.g. the process restarted between start and finish). The
    /// start time falls back from the recorded start, to the terminal's
    /// own reported timestamp, to the current processing time, so the
    /// derived latency is never negative.
    pub fn resolve(
        &self,
        id: &RequestId,
        url: String,
        method: String,
        outcome: RequestOutcome,
        observed_at_ms: Option<UnixMillis>,
    ) -> LogEntry {
        let now = now_unix_millis();
        let recorded = self.pending.remove(id).map(|(_, started_at)| started_at);
        if recorded.is_none() {
            tracing::debug!(id = %id, "terminal signal with no matching start");
        }
        let finished_at = observed_at_ms.unwrap_or(now);
        let started_at = recorded.or(observed_at_ms).unwrap_or(now);
        let latency_ms = finished_at.saturating_sub(started_at);
        LogEntry::from_outcome(url, method, outcome, latency_ms, chrono::Utc::now())
    }

    /// Drop pending starts older than `max_age`, bounding the leak from
    /// starts that never receive a terminal signal. Returns the number
    /// of entries evicted.
    pub fn evict_stale(&self, max_age: Duration) -> usize {
        let now = now_unix_millis();
        let max_age_ms = max_age.as_millis() as u64;
        let before = self.pending.len();
        self.pending
            .retain(|_, started_at| now.saturating_sub(*started_at) <= max_age_ms);
        before.saturating_sub(self.pending.len())
    }

    /// Number of in-flight requests currently tracked.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The monitor engine: consumes request signals, correlates them, and
/// feeds finalized entries into the log store.
pub struct Monitor {
    table: CorrelationTable,
    store: Arc<LogStore>,
    stale_after: Duration,
}

impl Monitor {
    /// Create a monitor writing into the given store.
    pub fn new(store: Arc<LogStore>, stale_after: Duration) -> Self {
        Self {
            table: CorrelationTable::new(),
            store,
            stale_after,
        }
    }

    /// Process one signal. Only http(s) requests are observed.
    pub fn handle(&self, signal: RequestSignal) {
        if !signal.url().starts_with("http") {
            tracing::trace!(url = signal.url(), "ignoring non-http signal");
            return;
        }
        match signal {
            RequestSignal::Started {
                id, observed_at_ms, ..
            } => {
                self.table.record_start(id, observed_at_ms);
            },
            RequestSignal::Completed {
                id,
                url,
                method,
                status_code,
                observed_at_ms,
            } => {
                let entry = self.table.resolve(
                    &id,
                    url,
                    method,
                    RequestOutcome::Completed { status_code },
                    observed_at_ms,
                );
                tracing::debug!(
                    domain = %entry.domain,
                    status = status_code,
                    latency_ms = entry.latency_ms,
                    "request completed"
                );
                self.store.insert(entry);
            },
            RequestSignal::Failed {
                id,
                url,
                method,
                error_reason,
                observed_at_ms,
            } => {
                let entry = self.table.resolve(
                    &id,
                    url,
                    method,
                    RequestOutcome::Failed { error_reason },
                    observed_at_ms,
                );
                tracing::warn!(
                    domain = %entry.domain,
                    error = entry.error_reason.as_deref().unwrap_or(""),
                    latency_ms = entry.latency_ms,
                    "request failed"
                );
                self.store.insert(entry);
            },
        }
    }

    /// Consume signals from the channel until it closes, sweeping stale
    /// pending starts on a timer.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<RequestSignal>) {
        let period = (self.stale_after / 4).max(Duration::from_secs(1));
        let mut sweep = tokio::time::interval(period);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                maybe_signal = rx.recv() => match maybe_signal {
                    Some(signal) => self.handle(signal),
                    None => break,
                },
                _ = sweep.tick() => {
                    let evicted = self.table.evict_stale(self.stale_after);
                    if evicted > 0 {
                        tracing::debug!(evicted, "evicted stale pending requests");
                    }
                }
            }
        }
        tracing::info!("signal channel closed, monitor stopping");
    }

    /// Number of in-flight requests currently tracked.
    pub fn in_flight(&self) -> usize {
        self.table.in_flight()
    }
}
