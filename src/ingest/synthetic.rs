//! Synthetic request traffic for demos and the sample-insert hook.
//!
//! Generates plausible request signals and log entries so the dashboard
//! can be exercised without a host networking layer attached.

use crate::core::{LogEntry, RequestId, RequestOutcome, RequestSignal};
use crate::ingest::SignalSender;
use rand::{thread_rng, Rng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Traffic profile for one synthetic endpoint.
#[derive(Debug, Clone)]
struct EndpointProfile {
    url: &'static str,
    method: &'static str,
    /// Typical latency in milliseconds
    base_p50_ms: u64,
    /// Slow-tail latency in milliseconds
    base_p95_ms: u64,
    /// Share of requests that fail at transport level (0.0 to 1.0)
    error_rate: f64,
    /// Share of responses that are non-2xx
    bad_status_rate: f64,
}

impl EndpointProfile {
    /// Draw a latency between P0 and P95 with a linear split at P50.
    fn latency_ms(&self) -> u64 {
        let mut rng = thread_rng();
        let percentile: f64 = rng.gen();
        if percentile < 0.5 {
            (self.base_p50_ms as f64 * percentile * 2.0) as u64
        } else {
            let range = self.base_p95_ms - self.base_p50_ms;
            let position = (percentile - 0.5) / 0.5;
            self.base_p50_ms + (range as f64 * position) as u64
        }
    }

    fn outcome(&self) -> RequestOutcome {
        let mut rng = thread_rng();
        if rng.gen::<f64>() < self.error_rate {
            let reason = ["net::ERR_TIMED_OUT", "net::ERR_CONNECTION_RESET", "dns failure"]
                [rng.gen_range(0..3)];
            RequestOutcome::Failed {
                error_reason: reason.to_string(),
            }
        } else if rng.gen::<f64>() < self.bad_status_rate {
            let status = [404, 429, 500, 502][rng.gen_range(0..4)];
            RequestOutcome::Completed {
                status_code: status,
            }
        } else {
            let status = [200, 200, 200, 201, 204][rng.gen_range(0..5)];
            RequestOutcome::Completed {
                status_code: status,
            }
        }
    }
}

const PROFILES: &[EndpointProfile] = &[
    EndpointProfile {
        url: "https://api.example.com/v1/users",
        method: "GET",
        base_p50_ms: 40,
        base_p95_ms: 120,
        error_rate: 0.01,
        bad_status_rate: 0.03,
    },
    EndpointProfile {
        url: "https://api.example.com/v1/orders",
        method: "POST",
        base_p50_ms: 90,
        base_p95_ms: 300,
        error_rate: 0.02,
        bad_status_rate: 0.05,
    },
    EndpointProfile {
        url: "https://cdn.example.net/assets/app.js",
        method: "GET",
        base_p50_ms: 15,
        base_p95_ms: 60,
        error_rate: 0.005,
        bad_status_rate: 0.01,
    },
    EndpointProfile {
        url: "https://payments.example.org/charge",
        method: "POST",
        base_p50_ms: 220,
        base_p95_ms: 800,
        error_rate: 0.04,
        bad_status_rate: 0.06,
    },
];

/// Generates synthetic entries and demo signal traffic.
pub struct SampleGenerator {
    id_counter: AtomicU64,
}

impl SampleGenerator {
    /// Create a generator with the built-in endpoint profiles.
    pub fn new() -> Self {
        Self {
            id_counter: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> RequestId {
        let n = self.id_counter.fetch_add(1, Ordering::Relaxed);
        RequestId::new(format!("sample-{}", n)).expect("generated id is valid")
    }

    fn profile(&self) -> &'static EndpointProfile {
        &PROFILES[thread_rng().gen_range(0..PROFILES.len())]
    }

    /// Produce one synthetic finalized entry.
    ///
    /// Callers insert these through the normal store path, so synthetic
    /// entries obey the same capacity and ordering rules as real ones.
    pub fn entry(&self) -> LogEntry {
        let profile = self.profile();
        LogEntry::from_outcome(
            profile.url.to_string(),
            profile.method.to_string(),
            profile.outcome(),
            profile.latency_ms(),
            chrono::Utc::now(),
        )
    }

    /// Produce `count` synthetic entries.
    pub fn entries(&self, count: usize) -> Vec<LogEntry> {
        (0..count).map(|_| self.entry()).collect()
    }

    /// Emit start/terminal signal pairs on the channel until it closes,
    /// exercising the full correlation path at roughly `rps` requests
    /// per second.
    pub async fn run(&self, tx: SignalSender, rps: f64) {
        let pause = Duration::from_secs_f64(1.0 / rps.max(0.1));
        loop {
            let profile = self.profile();
            let id = self.next_id();
            let url = profile.url.to_string();
            let method = profile.method.to_string();
            let latency = Duration::from_millis(profile.latency_ms());
            let outcome = profile.outcome();

            if tx
                .send(RequestSignal::Started {
                    id: id.clone(),
                    url: url.clone(),
                    method: method.clone(),
                    observed_at_ms: Some(crate::core::now_unix_millis()),
                })
                .await
                .is_err()
            {
                return;
            }

            let tx_terminal = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                let signal = match outcome {
                    RequestOutcome::Completed { status_code } => RequestSignal::Completed {
                        id,
                        url,
                        method,
                        status_code,
                        observed_at_ms: Some(crate::core::now_unix_millis()),
                    },
                    RequestOutcome::Failed { error_reason } => RequestSignal::Failed {
                        id,
                        url,
                        method,
                        error_reason,
                        observed_at_ms: Some(crate::core::now_unix_millis()),
                    },
                };
                let _ = tx_terminal.send(signal).await;
            });

            tokio::time::sleep(pause).await;
        }
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
