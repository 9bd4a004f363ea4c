//! Helpers shared by the NetBox tool definitions.

use serde_json::{Map, Value, json};

use crate::core::netbox::{Endpoint, FieldSource, Filters, ResourceRef};
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::error::{ToolError, ToolResult};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

pub fn default_active() -> String {
    "active".to_string()
}

/// Clamp a caller-supplied limit to `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(1, MAX_LIMIT) as usize
}

/// Reject a value that is not one of NetBox's choices for the field.
pub fn check_choice(param: &str, value: &str, allowed: &[&str]) -> ToolResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ToolError::validation(format!(
            "'{value}' is not a valid {param}; expected one of: {}",
            allowed.join(", ")
        )))
    }
}

/// Query filters built up by list/lookup tools.
#[derive(Debug, Default)]
pub struct FilterSet(Filters);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.eq(key, v),
            None => self,
        }
    }

    /// Filter on a related object, resolved to its ID first.
    pub async fn related(
        self,
        ctx: &ToolContext,
        field: &str,
        endpoint: Endpoint,
        reference: Option<&ResourceRef>,
    ) -> ToolResult<Self> {
        match ctx.client().resolve_opt(endpoint, reference).await? {
            Some(id) => Ok(self.eq(&format!("{field}_id"), id)),
            None => Ok(self),
        }
    }

    pub fn build(self) -> Filters {
        self.0
    }
}

/// Insert `value` under `key` when present.
pub fn put_opt(payload: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        payload.insert(key.to_string(), value.into());
    }
}

/// `{count, total, truncated, results}` for list tools, truncated to `limit`.
pub fn listing(items: Vec<Value>, limit: usize, brief: impl Fn(&Value) -> Value) -> Value {
    let total = items.len();
    let results: Vec<Value> = items.iter().take(limit).map(brief).collect();
    json!({
        "count": results.len(),
        "total": total,
        "truncated": total > limit,
        "results": results,
    })
}

/// NetBox renders choice fields as `{"value": ..., "label": ...}`.
pub fn status_value(status: &Value) -> Value {
    status.get("value").cloned().unwrap_or_else(|| status.clone())
}

/// Compact view of a related field: `{id, name}` whatever shape it arrived in.
pub fn related(object: &Value, field: &str) -> Value {
    match object.related_id(field) {
        Some(id) => json!({
            "id": id,
            "name": object.related_label(field),
        }),
        None => Value::Null,
    }
}

#[cfg(test)]
pub(crate) fn test_context(
    backend: std::sync::Arc<crate::core::netbox::testing::InMemoryNetBox>,
    tool: &'static str,
    confirm: bool,
) -> ToolContext {
    use crate::core::config::CacheConfig;
    use crate::core::netbox::NetBoxClient;

    let client = NetBoxClient::new(backend, &CacheConfig::default());
    ToolContext::new(std::sync::Arc::new(client), tool, confirm)
}
