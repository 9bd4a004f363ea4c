//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every route forwards the raw `arguments` object to the [`ToolBridge`], so
//! stdio calls get the same normalization, confirm gating and metrics as the
//! HTTP interfaces.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::CallToolResult,
};
use serde_json::Value;
use std::sync::Arc;

use super::bridge::ToolBridge;
use super::error::ToolResult;
use super::output::ToolOutput;

/// Build the tool router with one route per registered tool.
pub fn build_tool_router<S>(bridge: Arc<ToolBridge>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let tools: Vec<_> = bridge
        .registry()
        .descriptors()
        .map(|t| (t.name, t.to_tool()))
        .collect();

    tools
        .into_iter()
        .fold(ToolRouter::new(), |router, (name, tool)| {
            let bridge = bridge.clone();
            router.with_route(ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
                let bundle = ctx.arguments.clone().map(Value::Object).unwrap_or(Value::Null);
                let bridge = bridge.clone();
                async move { to_mcp_result(bridge.dispatch(name, bundle).await) }.boxed()
            }))
        })
}

/// Map a dispatch result onto MCP.
///
/// Caller errors become JSON-RPC `invalid_params` errors carrying the typed
/// body as `data`; domain and upstream failures become tool results with
/// `isError: true`.
pub fn to_mcp_result(result: ToolResult<ToolOutput>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(output) => Ok(output.to_call_result()),
        Err(e) if e.is_caller_error() => Err(McpError::invalid_params(
            e.to_string(),
            serde_json::to_value(e.body()).ok(),
        )),
        Err(e) => Ok(ToolOutput::failure(&e).to_call_result()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CacheConfig, SafetyConfig};
    use crate::core::metrics::Metrics;
    use crate::core::netbox::NetBoxClient;
    use crate::core::netbox::testing::InMemoryNetBox;
    use crate::domains::tools::error::ToolError;
    use crate::domains::tools::registry::ToolRegistry;

    struct TestServer {}

    fn bridge(safety: &SafetyConfig) -> Arc<ToolBridge> {
        let registry = Arc::new(ToolRegistry::with_defaults(safety).unwrap());
        let client = Arc::new(NetBoxClient::new(
            Arc::new(InMemoryNetBox::seeded()),
            &CacheConfig::default(),
        ));
        Arc::new(ToolBridge::new(registry, client, Arc::new(Metrics::new())))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(bridge(&SafetyConfig::default()));
        let tools = router.list_all();
        assert_eq!(tools.len(), 15);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"netbox_health_check"));
        assert!(names.contains(&"netbox_create_device"));
        assert!(names.contains(&"netbox_delete_device"));
    }

    #[test]
    fn test_registry_matches_router() {
        for read_only in [false, true] {
            let bridge = bridge(&SafetyConfig { read_only });
            let registry_names = bridge.registry().tool_names();

            let router: ToolRouter<TestServer> = build_tool_router(bridge.clone());
            let router_tools = router.list_all();
            let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

            assert_eq!(registry_names.len(), router_names.len());
            for name in registry_names {
                assert!(router_names.contains(&name));
            }
        }
    }

    #[test]
    fn test_mcp_error_mapping() {
        let err = to_mcp_result(Err(ToolError::MissingParameters {
            tool: "netbox_create_vlan".into(),
            missing: vec!["vid".into()],
        }))
        .unwrap_err();
        let data = err.data.unwrap();
        assert_eq!(data["type"], "validation");
        assert_eq!(data["missing"][0], "vid");

        let result = to_mcp_result(Err(ToolError::NotFound {
            resource: "site".into(),
            key: "dc9".into(),
        }))
        .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.structured_content.unwrap()["error"]["type"], "not_found");
    }
}
