use crate::core::error::{Result, WirelogError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp in milliseconds.
pub type UnixMillis = u64;

/// Current wall-clock time in unix milliseconds.
pub fn now_unix_millis() -> UnixMillis {
    chrono::Utc::now().timestamp_millis().max(0) as UnixMillis
}

/// Opaque identifier for a logical request, assigned by the host
/// networking layer. The correlation key for start/terminal pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a new RequestId after validation
    pub fn new(id: String) -> Result<Self> {
        if id.is_empty() {
            return Err(WirelogError::InvalidSignal("RequestId cannot be empty".to_string()));
        }
        if id.len() > 64 {
            return Err(WirelogError::InvalidSignal(format!(
                "RequestId cannot exceed 64 characters, got {}",
                id.len()
            )));
        }
        Ok(RequestId(id))
    }

    /// Returns the string representation of the request ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner string value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The request received a response with the given HTTP status code
    Completed { status_code: u16 },
    /// The request failed before a response was received
    Failed { error_reason: String },
}

impl RequestOutcome {
    /// Returns true if this outcome represents a transport-level failure
    pub fn is_failure(&self) -> bool {
        matches!(self, RequestOutcome::Failed { .. })
    }
}

/// A raw event emitted by the host networking layer.
///
/// One `Started` and exactly one terminal signal (`Completed` or `Failed`)
/// are expected per id, but a terminal signal may legitimately arrive with
/// no matching start (process restart, clock/ordering edge cases). The
/// `observed_at_ms` stamp is best-effort: some host layers do not stamp
/// every event.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSignal {
    /// A request left the host process
    Started {
        id: RequestId,
        url: String,
        method: String,
        observed_at_ms: Option<UnixMillis>,
    },
    /// A response arrived
    Completed {
        id: RequestId,
        url: String,
        method: String,
        status_code: u16,
        observed_at_ms: Option<UnixMillis>,
    },
    /// The request failed without a response
    Failed {
        id: RequestId,
        url: String,
        method: String,
        error_reason: String,
        observed_at_ms: Option<UnixMillis>,
    },
}

impl RequestSignal {
    /// Returns the request id this signal belongs to
    pub fn id(&self) -> &RequestId {
        match self {
            Self::Started { id, .. } | Self::Completed { id, .. } | Self::Failed { id, .. } => id,
        }
    }

    /// Returns the target URL
    pub fn url(&self) -> &str {
        match self {
            Self::Started { url, .. } | Self::Completed { url, .. } | Self::Failed { url, .. } => {
                url
            },
        }
    }

    /// Returns the HTTP method
    pub fn method(&self) -> &str {
        match self {
            Self::Started { method, .. }
            | Self::Completed { method, .. }
            | Self::Failed { method, .. } => method,
        }
    }

    /// Returns the event timestamp reported by the host layer, if any
    pub fn observed_at_ms(&self) -> Option<UnixMillis> {
        match self {
            Self::Started { observed_at_ms, .. }
            | Self::Completed { observed_at_ms, .. }
            | Self::Failed { observed_at_ms, .. } => *observed_at_ms,
        }
    }

    /// Returns true for `Completed` and `Failed` signals
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started { .. })
    }
}

/// A finalized, immutable log record derived from a correlated request.
///
/// Exactly one of `status_code` (completed requests) or `error_reason`
/// (failed requests, which carry `status_code = 0`) is meaningfully set.
/// Field names on the wire match the persisted dashboard layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Full request URL
    pub url: String,
    /// Host component of the URL, or the raw URL when it cannot be parsed
    pub domain: String,
    /// HTTP method
    pub method: String,
    /// HTTP status code; 0 for failed requests
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    /// Failure reason for requests that never got a response
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// Wall-clock latency between start and terminal signal
    #[serde(rename = "latencyMs")]
    pub latency_ms: u64,
    /// ISO-8601 timestamp of the terminal signal
    #[serde(rename = "timestamp")]
    pub observed_at: String,
}

impl LogEntry {
    /// Builds an entry from a correlated request.
    pub fn from_outcome(
        url: String,
        method: String,
        outcome: RequestOutcome,
        latency_ms: u64,
        observed_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let domain = host_for_url(&url);
        let (status_code, error_reason) = match outcome {
            RequestOutcome::Completed { status_code } => (Some(status_code), None),
            RequestOutcome::Failed { error_reason } => (Some(0), Some(error_reason)),
        };
        LogEntry {
            url,
            domain,
            method,
            status_code,
            error_reason,
            latency_ms,
            observed_at: observed_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    /// Returns true if this entry counts as a success (2xx status)
    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }

    /// Returns the string the filter matches against: the domain,
    /// falling back to the raw URL when no domain was extracted.
    pub fn filter_key(&self) -> &str {
        if self.domain.is_empty() {
            &self.url
        } else {
            &self.domain
        }
    }
}

/// Extracts the host component from a URL.
///
/// Malformed URLs fall back to the raw input string, never an error:
/// a record is always produced even for garbage input.
pub fn host_for_url(url: &str) -> String {
    let rest = match url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => rest,
        _ => return url.to_string(),
    };
    let authority = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(rest);
    // Strip userinfo, then the port.
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}
