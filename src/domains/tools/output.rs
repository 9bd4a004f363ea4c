//! Structured tool results.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::Value;

use super::error::{ErrorBody, ToolError};

/// Output from a tool execution.
///
/// Always serializes to a mapping with a `success` flag. Previews of
/// unconfirmed writes carry `dry_run: true`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolOutput {
    /// Whether the execution was successful.
    pub success: bool,

    /// Set when a write was previewed instead of executed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,

    /// The result data from the tool.
    pub data: Value,

    /// Human readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Error details if execution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ToolOutput {
    /// Create a successful tool output.
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            dry_run: false,
            data,
            message: None,
            error: None,
        }
    }

    /// Create a dry-run preview.
    pub fn preview(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            dry_run: true,
            data,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Create a failed tool output.
    pub fn failure(error: &ToolError) -> Self {
        Self {
            success: false,
            dry_run: false,
            data: Value::Null,
            message: Some(error.to_string()),
            error: Some(error.body()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Convert into an MCP tool result (text summary + structured content).
    pub fn to_call_result(&self) -> CallToolResult {
        let structured = self.to_value();
        let json = serde_json::to_string_pretty(&structured).unwrap_or_default();
        let text = match &self.message {
            Some(message) => format!("{message}\n\n{json}"),
            None => json,
        };

        CallToolResult {
            content: vec![Content::text(text)],
            structured_content: Some(structured),
            is_error: Some(!self.success),
            meta: None,
        }
    }
}
