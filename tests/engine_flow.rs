//! Integration tests driving the full pipeline: signals through the
//! monitor channel, correlation, bounded storage, aggregation, filtering,
//! and export.

use std::sync::Arc;
use std::time::Duration;
use wirelog::core::{now_unix_millis, LogEntry, RequestId, RequestSignal};
use wirelog::export::{ExportFormat, LogExporter};
use wirelog::ingest::{Monitor, SampleGenerator};
use wirelog::storage::{LogStore, MemoryBackend};
use wirelog::{filter, metrics};

fn id(s: &str) -> RequestId {
    RequestId::new(s.to_string()).unwrap()
}

fn started(name: &str, url: &str, at: u64) -> RequestSignal {
    RequestSignal::Started {
        id: id(name),
        url: url.to_string(),
        method: "GET".to_string(),
        observed_at_ms: Some(at),
    }
}

fn completed(name: &str, url: &str, status: u16, at: u64) -> RequestSignal {
    RequestSignal::Completed {
        id: id(name),
        url: url.to_string(),
        method: "GET".to_string(),
        status_code: status,
        observed_at_ms: Some(at),
    }
}

fn failed(name: &str, url: &str, reason: &str, at: u64) -> RequestSignal {
    RequestSignal::Failed {
        id: id(name),
        url: url.to_string(),
        method: "GET".to_string(),
        error_reason: reason.to_string(),
        observed_at_ms: Some(at),
    }
}

async fn drain(store: &LogStore, expected: usize) -> Vec<LogEntry> {
    for _ in 0..400 {
        if store.len() >= expected {
            return store.get_all();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("store never reached {} entries, has {}", expected, store.len());
}

#[tokio::test]
async fn test_signals_flow_through_channel_to_metrics() {
    let store = Arc::new(LogStore::new(50));
    let monitor = Arc::new(Monitor::new(store.clone(), Duration::from_secs(300)));
    let (tx, rx) = tokio::sync::mpsc::channel(64);
    tokio::spawn(Arc::clone(&monitor).run(rx));

    let base = now_unix_millis();
    // Two interleaved requests and one orphaned failure, delivered out
    // of chronological order.
    tx.send(started("a", "https://api.example.com/users", base))
        .await
        .unwrap();
    tx.send(started("b", "https://cdn.example.net/app.js", base + 10))
        .await
        .unwrap();
    tx.send(completed("b", "https://cdn.example.net/app.js", 200, base + 40))
        .await
        .unwrap();
    tx.send(failed("ghost", "https://api.example.com/ping", "timeout", base + 50))
        .await
        .unwrap();
    tx.send(completed("a", "https://api.example.com/users", 200, base + 250))
        .await
        .unwrap();

    let logs = drain(&store, 3).await;
    assert_eq!(logs.len(), 3);

    // Newest first by insertion.
    assert_eq!(logs[0].domain, "api.example.com");
    assert_eq!(logs[0].latency_ms, 250);
    assert_eq!(logs[1].status_code, Some(0));
    assert_eq!(logs[1].error_reason.as_deref(), Some("timeout"));
    assert_eq!(logs[2].domain, "cdn.example.net");
    assert_eq!(logs[2].latency_ms, 30);

    // No pending state leaks after terminals.
    assert_eq!(monitor.in_flight(), 0);

    let stats = metrics::snapshot(&logs);
    assert_eq!(stats.count, 3);
    // 2 of 3 succeeded.
    assert_eq!(stats.success_rate_percent, 67);
    assert!(stats.responsiveness_score <= 100);
    assert_eq!(stats.bars.len(), 3);
}

#[tokio::test]
async fn test_capacity_enforced_end_to_end() {
    let store = Arc::new(LogStore::new(10));
    let monitor = Arc::new(Monitor::new(store.clone(), Duration::from_secs(300)));
    let (tx, rx) = tokio::sync::mpsc::channel(64);
    tokio::spawn(Arc::clone(&monitor).run(rx));

    let base = now_unix_millis();
    for i in 0..15u64 {
        let name = format!("req-{}", i);
        let url = format!("https://host{}.example.com/", i);
        tx.send(started(&name, &url, base)).await.unwrap();
        tx.send(completed(&name, &url, 200, base + i)).await.unwrap();
    }

    drain(&store, 10).await;
    // Wait for the last request to land, then confirm the bound holds.
    for _ in 0..200 {
        if store.get_all().first().map(|e| e.domain.as_str()) == Some("host14.example.com") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let logs = store.get_all();
    assert_eq!(logs.len(), 10);
    assert_eq!(logs[0].domain, "host14.example.com");
    assert_eq!(logs[9].domain, "host5.example.com");
}

#[tokio::test]
async fn test_filter_and_export_over_live_store() {
    let store = Arc::new(LogStore::new(100));
    let generator = SampleGenerator::new();
    for entry in generator.entries(20) {
        store.insert(entry);
    }

    let logs = store.get_all();
    let matched = filter::apply(&logs, "example.com");
    assert!(matched.iter().all(|e| e.domain.contains("example.com")));
    // Filtering twice changes nothing.
    assert_eq!(filter::apply(&matched, "example.com"), matched);

    let doc = LogExporter::export(&matched, ExportFormat::Json).unwrap();
    let parsed: Vec<LogEntry> = serde_json::from_str(&doc).unwrap();
    assert_eq!(parsed, matched);
}

#[tokio::test]
async fn test_clear_then_export_yields_empty_document() {
    let store = Arc::new(LogStore::new(100));
    let generator = SampleGenerator::new();
    for entry in generator.entries(5) {
        store.insert(entry);
    }
    store.clear();

    let doc = LogExporter::export(&store.get_all(), ExportFormat::Json).unwrap();
    assert_eq!(doc, "[]");
    let csv = LogExporter::export(&store.get_all(), ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[tokio::test]
async fn test_retention_survives_restart() {
    let backend = Arc::new(MemoryBackend::new());
    {
        let store = LogStore::with_persistence(100, backend.clone());
        let generator = SampleGenerator::new();
        for entry in generator.entries(8) {
            store.insert(entry);
        }
        store.set_retention_capacity(20);
        // Wait for the last snapshot to land.
        for _ in 0..200 {
            if backend
                .saved()
                .map(|s| s.retention_capacity == 20 && s.network_logs.len() == 8)
                .unwrap_or(false)
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    let restored = LogStore::restore(backend.clone(), 100).await;
    assert_eq!(restored.retention_capacity(), 20);
    assert_eq!(restored.len(), 8);
}

#[tokio::test]
async fn test_persistence_outage_never_fails_operations() {
    let backend = Arc::new(MemoryBackend::with_failing_saves());
    let store = Arc::new(LogStore::with_persistence(30, backend.clone()));
    let monitor = Arc::new(Monitor::new(store.clone(), Duration::from_secs(300)));

    let base = now_unix_millis();
    monitor.handle(started("x", "https://api.example.com/", base));
    monitor.handle(completed("x", "https://api.example.com/", 200, base + 5));
    store.set_retention_capacity(15);
    store.clear();

    tokio::time::sleep(Duration::from_millis(50)).await;
    // Nothing was persisted, but the in-memory store answered every
    // operation and remains authoritative.
    assert!(backend.saved().is_none());
    assert!(store.is_empty());
    assert_eq!(store.retention_capacity(), 15);
}

#[tokio::test]
async fn test_synthetic_traffic_exercises_correlation_path() {
    let store = Arc::new(LogStore::new(200));
    let monitor = Arc::new(Monitor::new(store.clone(), Duration::from_secs(300)));
    let (tx, rx) = tokio::sync::mpsc::channel(256);
    tokio::spawn(Arc::clone(&monitor).run(rx));

    let generator = Arc::new(SampleGenerator::new());
    let demo = {
        let generator = Arc::clone(&generator);
        tokio::spawn(async move { generator.run(tx, 200.0).await })
    };

    let logs = drain(&store, 5).await;
    demo.abort();

    for entry in &logs {
        assert!(!entry.domain.is_empty());
        match entry.status_code {
            Some(0) => assert!(entry.error_reason.is_some()),
            Some(_) => assert!(entry.error_reason.is_none()),
            None => panic!("entry without status"),
        }
    }
}
