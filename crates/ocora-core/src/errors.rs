//! Error types for the Ocora orchestration layer.

use thiserror::Error;

/// Unified error type for all Ocora operations
#[derive(Debug, Error)]
pub enum OcoraError {
    /// Backend request failed (network error or non-2xx status)
    #[error("gateway request to /{endpoint} failed: {message}")]
    Gateway { endpoint: String, message: String },

    /// Backend request exceeded the configured deadline
    #[error("gateway request to /{endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// Backend payload could not be decoded into the expected shape
    #[error("payload decode failed: {0}")]
    Decode(String),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-supplied input rejected
    #[error("validation error: {0}")]
    Validation(String),

    /// External adapter (reasoning service, report renderer) failure
    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcoraError {
    pub fn gateway(endpoint: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Gateway {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn timeout(endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            endpoint: endpoint.into(),
            timeout_ms,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }

    /// Whether the failure is expected to clear on its own (backend
    /// unreachable or slow). Transient failures are the ones the lenient
    /// fallback path recovers from.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Gateway { .. } | Self::Timeout { .. })
    }
}

/// Result type alias for Ocora operations
pub type Result<T> = std::result::Result<T, OcoraError>;
