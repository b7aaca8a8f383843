//! Rolling health metrics derived from the current log collection.
//!
//! Everything here is a pure function of its input: the aggregator
//! holds no state and is re-run on every store change.

use crate::core::LogEntry;
use serde::Serialize;

/// Number of newest entries feeding the bar series and the
/// responsiveness score.
pub const BAR_WINDOW: usize = 10;

/// Minimum rendered bar height, so a bar is always visible.
pub const BAR_FLOOR_PERCENT: u8 = 6;

/// One bar of the latency chart, oldest first for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyBar {
    /// Latency of the underlying request
    #[serde(rename = "latencyMs")]
    pub latency_ms: u64,
    /// Bar height relative to the slowest request in the window
    #[serde(rename = "heightPercent")]
    pub height_percent: u8,
}

/// Aggregated dashboard snapshot for the current collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Number of stored entries
    pub count: usize,
    /// Mean latency across all stored entries, rounded
    #[serde(rename = "averageLatencyMs")]
    pub average_latency_ms: u64,
    /// Share of entries with a 2xx status, rounded percent
    #[serde(rename = "successRatePercent")]
    pub success_rate_percent: u8,
    /// Latency-derived responsiveness proxy in [0, 100].
    ///
    /// This is not a bandwidth measurement: it is a bounded score that
    /// decreases as the windowed average latency grows.
    #[serde(rename = "responsivenessScore")]
    pub responsiveness_score: u8,
    /// Bar series over the newest requests, oldest first
    pub bars: Vec<LatencyBar>,
}

impl DashboardStats {
    /// Stats for an empty collection: all zeros, no bars.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average_latency_ms: 0,
            success_rate_percent: 0,
            responsiveness_score: 0,
            bars: Vec::new(),
        }
    }
}

/// Compute the dashboard snapshot for a newest-first collection.
pub fn snapshot(entries: &[LogEntry]) -> DashboardStats {
    let count = entries.len();
    if count == 0 {
        return DashboardStats::empty();
    }

    let total_latency: u64 = entries.iter().map(|e| e.latency_ms).sum();
    let average_latency_ms = (total_latency as f64 / count as f64).round() as u64;

    let successes = entries.iter().filter(|e| e.is_success()).count();
    let success_rate_percent = (100.0 * successes as f64 / count as f64).round() as u8;

    // Newest min(10, count) entries, reversed to oldest-first so the
    // chart reads left to right in time.
    let window: Vec<u64> = entries
        .iter()
        .take(BAR_WINDOW)
        .rev()
        .map(|e| e.latency_ms)
        .collect();
    // Guards the division when every windowed latency is zero.
    let max_latency = window.iter().copied().max().unwrap_or(0).max(1);

    let bars = window
        .iter()
        .map(|&latency_ms| LatencyBar {
            latency_ms,
            height_percent: bar_height(latency_ms, max_latency),
        })
        .collect();

    let avg_window = window.iter().sum::<u64>() as f64 / window.len() as f64;
    let responsiveness_score = ((1000.0 / avg_window.max(1.0)) * 10.0).round().min(100.0) as u8;

    DashboardStats {
        count,
        average_latency_ms,
        success_rate_percent,
        responsiveness_score,
        bars,
    }
}

fn bar_height(latency_ms: u64, max_latency: u64) -> u8 {
    let relative = 1.0 - latency_ms as f64 / max_latency as f64;
    let height = (relative * 100.0).round() as u8;
    height.max(BAR_FLOOR_PERCENT)
}
