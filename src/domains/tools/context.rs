//! Execution context injected into tool handlers, and the confirm gate.

use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use super::error::ToolResult;
use super::output::ToolOutput;
use crate::core::netbox::{Endpoint, FieldSource, NetBoxClient};

/// A mutation a handler wants to perform.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Create {
        endpoint: Endpoint,
        payload: Value,
    },
    Update {
        endpoint: Endpoint,
        id: i64,
        current: Value,
        changes: Value,
    },
    Delete {
        endpoint: Endpoint,
        id: i64,
        current: Value,
    },
}

impl WriteOp {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Create { endpoint, .. }
            | Self::Update { endpoint, .. }
            | Self::Delete { endpoint, .. } => *endpoint,
        }
    }

    /// What would be sent to NetBox.
    pub fn preview(&self) -> Value {
        let endpoint = self.endpoint();
        match self {
            Self::Create { payload, .. } => json!({
                "action": "create",
                "resource": endpoint.label(),
                "endpoint": endpoint.path(),
                "payload": payload,
            }),
            Self::Update {
                id,
                current,
                changes,
                ..
            } => json!({
                "action": "update",
                "resource": endpoint.label(),
                "endpoint": endpoint.path(),
                "id": id,
                "target": current.label(),
                "changes": changes,
            }),
            Self::Delete { id, current, .. } => json!({
                "action": "delete",
                "resource": endpoint.label(),
                "endpoint": endpoint.path(),
                "id": id,
                "target": current.label(),
                "object": current,
            }),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Create { payload, .. } => format!("create {} {}", self.endpoint().label(), payload.label()),
            Self::Update { current, .. } | Self::Delete { current, .. } => {
                format!("{} {} {}", self.action(), self.endpoint().label(), current.label())
            }
        }
    }
}

/// Dependencies and request envelope handed to every handler.
#[derive(Clone)]
pub struct ToolContext {
    client: Arc<NetBoxClient>,
    tool: &'static str,
    confirm: bool,
}

impl ToolContext {
    pub fn new(client: Arc<NetBoxClient>, tool: &'static str, confirm: bool) -> Self {
        Self {
            client,
            tool,
            confirm,
        }
    }

    pub fn client(&self) -> &NetBoxClient {
        &self.client
    }

    /// Name of the tool being executed.
    pub fn tool(&self) -> &'static str {
        self.tool
    }

    /// Execute `op` if the call was confirmed, otherwise return a preview.
    ///
    /// This is the only path from a handler to a NetBox mutation.
    pub async fn commit(&self, op: WriteOp) -> ToolResult<ToolOutput> {
        let description = op.describe();

        if !self.confirm {
            info!(tool = self.tool, action = op.action(), "Dry run: {}", description);
            return Ok(ToolOutput::preview(
                op.preview(),
                format!("Dry run: would {description}. Re-run with confirm=true to apply."),
            ));
        }

        let client = self.client();
        let data = match op {
            WriteOp::Create { endpoint, payload } => {
                let created = client.create(endpoint, &payload).await?;
                json!({"action": "create", "resource": endpoint.label(), "object": created})
            }
            WriteOp::Update {
                endpoint,
                id,
                changes,
                ..
            } => {
                let updated = client.update(endpoint, id, &changes).await?;
                json!({"action": "update", "resource": endpoint.label(), "object": updated})
            }
            WriteOp::Delete { endpoint, id, current } => {
                client.delete(endpoint, id).await?;
                json!({"action": "delete", "resource": endpoint.label(), "id": id, "object": current})
            }
        };

        Ok(ToolOutput::success(data).with_message(format!("Done: {description}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CacheConfig;
    use crate::core::netbox::testing::InMemoryNetBox;

    fn context(backend: Arc<InMemoryNetBox>, confirm: bool) -> ToolContext {
        let client = Arc::new(NetBoxClient::new(backend, &CacheConfig::default()));
        ToolContext::new(client, "test_tool", confirm)
    }

    fn create_site() -> WriteOp {
        WriteOp::Create {
            endpoint: Endpoint::Sites,
            payload: json!({"name": "Lab", "slug": "lab", "status": "active"}),
        }
    }

    #[tokio::test]
    async fn test_unconfirmed_commit_is_preview() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let out = context(backend.clone(), false)
            .commit(create_site())
            .await
            .unwrap();

        assert!(out.success);
        assert!(out.dry_run);
        assert_eq!(out.data["action"], "create");
        assert_eq!(out.data["payload"]["slug"], "lab");
        assert!(out.message.unwrap().contains("confirm=true"));
        assert_eq!(backend.mutations(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_commit_executes() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let out = context(backend.clone(), true)
            .commit(create_site())
            .await
            .unwrap();

        assert!(out.success);
        assert!(!out.dry_run);
        assert_eq!(out.data["object"]["slug"], "lab");
        assert_eq!(backend.mutations(), 1);
    }

    #[tokio::test]
    async fn test_delete_preview_names_target() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let current = json!({"id": 1, "name": "edge-01"});
        let op = WriteOp::Delete {
            endpoint: Endpoint::Devices,
            id: 1,
            current,
        };
        let out = context(backend.clone(), false).commit(op).await.unwrap();
        assert_eq!(out.data["target"], "edge-01");
        assert_eq!(backend.objects(Endpoint::Devices).len(), 1);
    }
}
