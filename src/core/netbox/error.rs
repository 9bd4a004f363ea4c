//! NetBox client error types.

use thiserror::Error;

/// Result type for NetBox client operations.
pub type NetBoxResult<T> = Result<T, NetBoxError>;

/// Errors raised while talking to the NetBox REST API.
#[derive(Debug, Error)]
pub enum NetBoxError {
    /// The referenced object does not exist.
    #[error("{resource} not found: {key}")]
    NotFound { resource: String, key: String },

    /// The target object already exists.
    #[error("{resource} already exists: {key}")]
    Conflict { resource: String, key: String },

    /// NetBox rejected the request payload (HTTP 400).
    #[error("NetBox rejected the request: {0}")]
    Validation(String),

    /// Any other non-success HTTP status.
    #[error("NetBox returned {status} for {method} {url}: {body}")]
    Upstream {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// Network-level failure (connect, timeout, TLS).
    #[error("Request to NetBox failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be understood.
    #[error("Unexpected NetBox response: {0}")]
    InvalidResponse(String),

    /// The client could not be constructed from configuration.
    #[error("Invalid NetBox client configuration: {0}")]
    Config(String),
}

impl NetBoxError {
    /// Create a "not found" error for a resource label and lookup key.
    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Create a "conflict" error for a resource label and lookup key.
    pub fn conflict(resource: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Create an "invalid response" error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether a read that failed with this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
