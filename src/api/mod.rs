//! HTTP API for the dashboard.
//!
//! A small set of endpoints the presentation layer polls: the ordered
//! log collection (optionally filtered), aggregated stats, clear,
//! export, a synthetic-sample hook, and the retention setting.

use crate::core::{Result, WirelogError};
use crate::export::{ExportFormat, LogExporter};
use crate::ingest::SampleGenerator;
use crate::storage::LogStore;
use crate::{filter, metrics};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on (default: 8080)
    pub port: u16,
    /// Bind address
    pub bind_address: std::net::IpAddr,
    /// Enable CORS headers for browser dashboards
    pub enable_cors: bool,
    /// Cap on synthetic entries inserted per sample request
    pub max_sample_batch: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: std::net::IpAddr::from([0, 0, 0, 0]),
            enable_cors: true,
            max_sample_batch: 100,
        }
    }
}

/// API server state.
#[derive(Clone)]
struct ApiState {
    store: Arc<LogStore>,
    generator: Arc<SampleGenerator>,
    started_at: std::time::Instant,
    config: ApiConfig,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    log_count: usize,
    retention_capacity: usize,
}

/// Log listing response. `total` and `matched` differ only when a
/// filter query is active, letting the dashboard distinguish an empty
/// store from a filter with no matches.
#[derive(Debug, Serialize)]
struct LogsResponse {
    total: usize,
    matched: usize,
    logs: Vec<crate::core::LogEntry>,
}

/// Acknowledgement for commands without a payload.
#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

/// Query parameters for log listing and export.
#[derive(Debug, Deserialize)]
struct LogsQuery {
    /// Filter query over the domain (fallback: url)
    q: Option<String>,
    /// Export format (json, csv)
    format: Option<String>,
}

/// Query parameters for the sample hook.
#[derive(Debug, Deserialize)]
struct SampleQuery {
    count: Option<usize>,
}

/// Body for the retention setting. The raw value is coerced and
/// clamped, never rejected: a bad retention value is a tolerated
/// configuration anomaly.
#[derive(Debug, Deserialize)]
struct RetentionRequest {
    capacity: serde_json::Value,
}

/// Start the API server.
pub async fn start_server(
    store: Arc<LogStore>,
    generator: Arc<SampleGenerator>,
    config: ApiConfig,
) -> Result<()> {
    let state = ApiState {
        store,
        generator,
        started_at: std::time::Instant::now(),
        config: config.clone(),
    };

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/logs", get(list_logs_handler))
        .route("/api/logs/clear", post(clear_logs_handler))
        .route("/api/logs/export", get(export_logs_handler))
        .route("/api/logs/sample", post(insert_sample_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/retention", put(set_retention_handler))
        .with_state(state);

    if config.enable_cors {
        app = app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
    }

    let addr = std::net::SocketAddr::new(config.bind_address, config.port);
    tracing::info!("Starting API server on http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| WirelogError::server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| WirelogError::server(format!("API server error: {}", e)))?;

    Ok(())
}

/// GET /health - process health and store statistics
async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        log_count: state.store.len(),
        retention_capacity: state.store.retention_capacity(),
    })
}

/// GET /api/logs - ordered log collection, optionally filtered
async fn list_logs_handler(
    State(state): State<ApiState>,
    Query(params): Query<LogsQuery>,
) -> impl IntoResponse {
    let logs = state.store.get_all();
    let total = logs.len();
    let matched = filter::apply(&logs, params.q.as_deref().unwrap_or(""));
    Json(LogsResponse {
        total,
        matched: matched.len(),
        logs: matched,
    })
}

/// POST /api/logs/clear - empty the store
async fn clear_logs_handler(State(state): State<ApiState>) -> impl IntoResponse {
    state.store.clear();
    Json(OkResponse { ok: true })
}

/// GET /api/logs/export - download the (optionally filtered) collection
async fn export_logs_handler(
    State(state): State<ApiState>,
    Query(params): Query<LogsQuery>,
) -> impl IntoResponse {
    let format = match params.format.as_deref().unwrap_or("json").parse::<ExportFormat>() {
        Ok(f) => f,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid format: {}", e),
                    code: 400,
                }),
            )
                .into_response();
        },
    };

    let logs = state.store.get_all();
    let selected = filter::apply(&logs, params.q.as_deref().unwrap_or(""));

    match LogExporter::export(&selected, format) {
        Ok(content) => {
            let filename = LogExporter::suggested_filename(format, chrono::Utc::now());
            let content_type = match format {
                ExportFormat::Json => "application/json",
                ExportFormat::Csv => "text/csv",
            };
            (
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                content,
            )
                .into_response()
        },
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Export failed: {}", e),
                code: 500,
            }),
        )
            .into_response(),
    }
}

/// POST /api/logs/sample - insert synthetic entries through the normal
/// insert path, so capacity and ordering rules apply unchanged
async fn insert_sample_handler(
    State(state): State<ApiState>,
    Query(params): Query<SampleQuery>,
) -> impl IntoResponse {
    let count = params.count.unwrap_or(5).min(state.config.max_sample_batch);
    for entry in state.generator.entries(count) {
        state.store.insert(entry);
    }
    Json(serde_json::json!({ "ok": true, "inserted": count }))
}

/// GET /api/stats - aggregated dashboard snapshot
async fn stats_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let logs = state.store.get_all();
    Json(metrics::snapshot(&logs))
}

/// PUT /api/retention - set retention capacity (clamped, immediate)
async fn set_retention_handler(
    State(state): State<ApiState>,
    Json(request): Json<RetentionRequest>,
) -> impl IntoResponse {
    let requested = request.capacity.as_u64().unwrap_or(0) as usize;
    let effective = state.store.set_retention_capacity(requested);
    Json(serde_json::json!({ "capacity": effective }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert!(config.enable_cors);
        assert_eq!(config.max_sample_batch, 100);
    }

    #[test]
    fn test_retention_request_coercion() {
        let request: RetentionRequest = serde_json::from_str(r#"{"capacity": "garbage"}"#).unwrap();
        assert_eq!(request.capacity.as_u64(), None);
        let request: RetentionRequest = serde_json::from_str(r#"{"capacity": 50}"#).unwrap();
        assert_eq!(request.capacity.as_u64(), Some(50));
    }
}
