//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] owns the tool bridge (registry + shared NetBox client +
//! metrics) and the rmcp router built from it. The stdio transport drives it
//! through rmcp's `ServerHandler`; the HTTP transport calls the helper methods
//! below, which dispatch through the same bridge.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use super::metrics::Metrics;
use super::netbox::{NetBoxClient, NetBoxResult};
use crate::domains::tools::{ToolBridge, ToolOutput, ToolRegistry, ToolResult, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dispatch shared by every interface.
    bridge: Arc<ToolBridge>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server talking to the NetBox instance in `config`.
    pub fn new(config: Config) -> CoreResult<Self> {
        let client = NetBoxClient::from_config(&config.netbox, &config.cache)?;
        Self::with_client(config, Arc::new(client))
    }

    /// Create a server around an existing client.
    pub fn with_client(config: Config, client: Arc<NetBoxClient>) -> CoreResult<Self> {
        let registry = ToolRegistry::with_defaults(&config.safety)?;
        info!(
            "Registered {} tools{}",
            registry.len(),
            if config.safety.read_only { " (read-only)" } else { "" }
        );

        let bridge = Arc::new(ToolBridge::new(
            Arc::new(registry),
            client,
            Arc::new(Metrics::new()),
        ));

        Ok(Self {
            tool_router: build_tool_router::<Self>(bridge.clone()),
            bridge,
            config: Arc::new(config),
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn bridge(&self) -> &Arc<ToolBridge> {
        &self.bridge
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// Tool metadata in MCP `tools/list` shape.
    pub fn list_tools(&self) -> Vec<Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name with a raw parameter bundle.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput> {
        self.bridge.dispatch(name, arguments).await
    }

    /// Probe NetBox; used by the readiness endpoint.
    pub async fn check_netbox(&self) -> NetBoxResult<Value> {
        self.bridge.client().status().await
    }

    /// Prometheus exposition text.
    pub fn render_metrics(&self) -> String {
        self.bridge
            .metrics()
            .render(self.bridge.client().cache_stats())
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut instructions = String::from(
            "Tools for reading and changing a NetBox instance. Objects such as sites, roles, \
             device types and tenants can be referenced by ID, slug or name. Write tools return \
             a dry-run preview unless called with confirm=true.",
        );
        if self.config.safety.read_only {
            instructions.push_str(" This server is read-only.");
        }

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}
