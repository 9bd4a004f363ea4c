//! Tool-specific error types.

use serde::Serialize;
use thiserror::Error;

use crate::core::netbox::NetBoxError;

/// Result type for tool execution.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool dispatch and execution.
///
/// Every variant maps to a stable tag (see [`ToolError::tag`]) that callers
/// can branch on without parsing messages.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required parameters were absent after normalization.
    #[error("Missing required parameter(s) for {tool}: {}", .missing.join(", "))]
    MissingParameters { tool: String, missing: Vec<String> },

    /// Malformed input.
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// A referenced NetBox object does not exist.
    #[error("{resource} not found: {key}")]
    NotFound { resource: String, key: String },

    /// The target NetBox object already exists.
    #[error("{resource} already exists: {key}")]
    Conflict { resource: String, key: String },

    /// NetBox failed or could not be reached.
    #[error("NetBox API error: {0}")]
    Upstream(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error body returned to callers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ToolError {
    /// Create a new "validation" error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable error tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::MissingParameters { .. } | Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller sent something wrong (as opposed to a failure
    /// further down).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_) | Self::MissingParameters { .. } | Self::Validation(_)
        )
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.tag(),
            message: self.to_string(),
            missing: match self {
                Self::MissingParameters { missing, .. } => missing.clone(),
                _ => Vec::new(),
            },
        }
    }
}

impl From<NetBoxError> for ToolError {
    fn from(error: NetBoxError) -> Self {
        match error {
            NetBoxError::NotFound { resource, key } => Self::NotFound { resource, key },
            NetBoxError::Conflict { resource, key } => Self::Conflict { resource, key },
            NetBoxError::Validation(msg) => Self::Validation(format!("NetBox rejected the request: {msg}")),
            NetBoxError::Config(msg) => Self::Internal(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}
