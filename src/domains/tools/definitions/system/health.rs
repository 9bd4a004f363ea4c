//! NetBox connectivity check.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::domains::tools::context::ToolContext;
use crate::domains::tools::descriptor::{ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::output::ToolOutput;

/// The health check takes no parameters.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HealthCheckParams {}

pub struct HealthCheckTool;

impl ToolDefinition for HealthCheckTool {
    const NAME: &'static str = "netbox_health_check";
    const CATEGORY: ToolCategory = ToolCategory::System;
    const DESCRIPTION: &'static str = "Check that the NetBox API is reachable and report its version and the read cache statistics.";
    const PARAMS: &'static [ParamSpec] = &[];

    type Params = HealthCheckParams;

    fn run(_params: HealthCheckParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let client = ctx.client();
            let cache = client.cache_stats().map(|stats| {
                json!({
                    "hits": stats.hits,
                    "misses": stats.misses,
                    "entries": stats.entries,
                })
            });

            let output = match client.status().await {
                Ok(status) => ToolOutput::success(json!({
                    "netbox": {
                        "reachable": true,
                        "version": status.get("netbox-version").cloned(),
                    },
                    "cache": cache,
                }))
                .with_message("NetBox is reachable"),
                Err(e) => {
                    warn!("NetBox health check failed: {}", e);
                    ToolOutput::success(json!({
                        "netbox": {
                            "reachable": false,
                            "error": e.to_string(),
                        },
                        "cache": cache,
                    }))
                    .with_message("NetBox is not reachable")
                }
            };
            Ok(output)
        }
        .boxed()
    }
}
