//! Wirelog - network request monitor with a live health dashboard.
//!
//! Wirelog observes outbound network requests made by a host process,
//! correlates asynchronous start/finish signals, measures per-request
//! latency and outcome, and maintains a bounded, queryable history used
//! to compute rolling health metrics.
//!
//! # Features
//!
//! - **Signal Correlation**: pairs start and terminal signals per request
//!   id, tolerating orphans, duplicates, and clock skew
//! - **Bounded History**: newest-first log store with configurable
//!   retention and best-effort persistence
//! - **Rolling Metrics**: latency averages, success rate, and a bounded
//!   responsiveness score for the dashboard
//! - **HTTP API**: query, filter, export, and clear the collection
//!
//! # Architecture
//!
//! - `ingest`: signal channel, correlation table, synthetic traffic
//! - `storage`: bounded log store and persistence backends
//! - `metrics`: pure read-side aggregation
//! - `filter` / `export`: presentation-side derivations
//! - `api`: HTTP surface for the dashboard
//! - `core`: domain models, errors, configuration
//!
//! # Example
//!
//! ```no_run
//! use wirelog::core::Config;
//! use wirelog::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let app = Application::new(config).await?;
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod application;
pub mod cli;
pub mod core;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod storage;

// Re-export core types for convenience
pub use crate::application::Application;
pub use crate::core::{Config, Result};
