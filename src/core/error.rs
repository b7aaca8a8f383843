use thiserror::Error;

#[derive(Error, Debug)]
pub enum WirelogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid signal data: {0}")]
    InvalidSignal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Channel send error")]
    ChannelSend,
}

/// Result type alias for wirelog operations
pub type Result<T> = std::result::Result<T, WirelogError>;

impl WirelogError {
    /// Creates a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new export error
    pub fn export<S: Into<String>>(msg: S) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a new server error
    pub fn server<S: Into<String>>(msg: S) -> Self {
        Self::Server(msg.into())
    }

    /// Returns true if the process can keep running after this error.
    ///
    /// Persistence failures are always recoverable: the in-memory store
    /// stays authoritative for the lifetime of the process.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage(_) => true,
            Self::ChannelSend => true,
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Export(_) => "export",
            Self::InvalidSignal(_) => "validation",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Server(_) => "server",
            Self::ChannelSend => "channel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WirelogError::storage("disk full");
        assert_eq!(err.to_string(), "Storage error: disk full");
        assert_eq!(err.category(), "storage");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(WirelogError::storage("write failed").is_recoverable());
        assert!(!WirelogError::config("bad port").is_recoverable());
        assert!(WirelogError::ChannelSend.is_recoverable());
    }
}
