//! Core domain models and business logic for wirelog.
//!
//! This module contains the fundamental types shared by the
//! correlation, storage, and aggregation layers.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, ConfigWatcher, DEFAULT_RETENTION, RETENTION_FLOOR};
pub use error::{Result, WirelogError};
pub use types::{
    host_for_url, now_unix_millis, LogEntry, RequestId, RequestOutcome, RequestSignal, UnixMillis,
};
