//! Error types for the DDNS updater
//!
//! This module defines all error types used throughout the workspace.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// One IP provider's failure, kept for the aggregated detection error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Provider name (catalog key)
    pub provider: String,
    /// Why the provider did not yield an address
    pub reason: String,
}

impl ProviderFailure {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Every configured IP provider failed
    #[error("IP detection failed, all providers exhausted: [{}]", join_failures(.failures))]
    DetectionFailed {
        /// Per-provider failure reasons, in the order they were tried
        failures: Vec<ProviderFailure>,
    },

    /// Zone/record auto-discovery could not resolve a unique target
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// The provider API answered with a non-success HTTP status
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error messages reported by the API (or the raw body)
        message: String,
        /// Server-supplied `Retry-After`, in seconds
        retry_after_secs: Option<u64>,
    },

    /// Transport-level HTTP failure (connect, timeout, unreadable body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create an aggregated detection error
    pub fn detection_failed(failures: Vec<ProviderFailure>) -> Self {
        Self::DetectionFailed { failures }
    }

    /// Create a discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create an API status error
    pub fn api(status: u16, message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            retry_after_secs,
        }
    }

    /// Create an HTTP transport error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// HTTP status carried by this error, if it came from an API response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 answer, which the Cloudflare client reads as endpoint drift
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for a 429 answer
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Server-requested wait before retrying, if any
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Self::Api {
                retry_after_secs: Some(secs),
                ..
            } => Some(std::time::Duration::from_secs(*secs)),
            _ => None,
        }
    }
}
