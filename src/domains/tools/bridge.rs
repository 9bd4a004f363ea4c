//! Tool dispatch bridge.
//!
//! Takes a tool name and a raw parameter bundle from any transport, normalizes
//! the bundle against the tool's signature, injects the shared NetBox client
//! and runs the handler. Every interface (stdio router, JSON-RPC over HTTP,
//! REST) dispatches through [`ToolBridge::dispatch`].

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use super::context::ToolContext;
use super::descriptor::ToolDescriptor;
use super::error::{ToolError, ToolResult};
use super::output::ToolOutput;
use super::params;
use super::registry::ToolRegistry;
use crate::core::metrics::{CallOutcome, Metrics};
use crate::core::netbox::NetBoxClient;

pub struct ToolBridge {
    registry: Arc<ToolRegistry>,
    client: Arc<NetBoxClient>,
    metrics: Arc<Metrics>,
}

impl ToolBridge {
    pub fn new(registry: Arc<ToolRegistry>, client: Arc<NetBoxClient>, metrics: Arc<Metrics>) -> Self {
        Self {
            registry,
            client,
            metrics,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn client(&self) -> &Arc<NetBoxClient> {
        &self.client
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Look up `name` and normalize `bundle` into its keyword arguments.
    pub fn prepare(&self, name: &str, bundle: Value) -> ToolResult<(&ToolDescriptor, rmcp::model::JsonObject)> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let kwargs = params::normalize(tool.name, tool.params, bundle)?;
        Ok((tool, kwargs))
    }

    /// Normalize, inject and invoke.
    #[instrument(skip(self, bundle), fields(encoding = params::encoding_of(&bundle)))]
    pub async fn dispatch(&self, name: &str, bundle: Value) -> ToolResult<ToolOutput> {
        let started = Instant::now();
        let request = bundle.clone();

        let result = match self.prepare(name, bundle) {
            Ok((tool, kwargs)) => {
                let confirm = tool.mutating
                    && kwargs.get("confirm").and_then(Value::as_bool).unwrap_or(false);
                info!(tool = tool.name, confirm, "Calling tool");
                let ctx = ToolContext::new(self.client.clone(), tool.name, confirm);
                tool.invoke(kwargs, ctx).await
            }
            Err(e) => Err(e),
        };

        let metric_name = if self.registry.get(name).is_some() {
            name
        } else {
            "unknown"
        };
        let outcome = match &result {
            Ok(out) if out.dry_run => CallOutcome::DryRun,
            Ok(_) => CallOutcome::Success,
            Err(e) => CallOutcome::Error(e.tag()),
        };
        self.metrics.record(metric_name, outcome, started.elapsed());

        if let Err(e) = &result {
            if e.is_caller_error() || matches!(e, ToolError::NotFound { .. } | ToolError::Conflict { .. }) {
                warn!(tool = name, error_type = e.tag(), "Tool call rejected: {}", e);
            } else {
                error!(tool = name, error_type = e.tag(), arguments = %request, "Tool call failed: {}", e);
            }
        }

        result
    }

    /// Like [`ToolBridge::dispatch`], folding errors into a failed output.
    pub async fn call(&self, name: &str, bundle: Value) -> ToolOutput {
        match self.dispatch(name, bundle).await {
            Ok(output) => output,
            Err(e) => ToolOutput::failure(&e),
        }
    }
}
