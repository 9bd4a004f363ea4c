//! Tools domain module.
//!
//! Tools are the NetBox operations exposed to MCP clients.
//!
//! ## Architecture
//!
//! - `definitions/` - tool implementations, grouped by NetBox app
//! - `descriptor.rs` - the [`ToolDefinition`] trait and type-erased descriptors
//! - `registry.rs` - immutable registry, the single source of tool metadata
//! - `params.rs` - normalization of raw parameter bundles
//! - `context.rs` - injected dependencies and the dry-run/confirm gate
//! - `bridge.rs` - dispatch shared by every transport
//! - `router.rs` - rmcp ToolRouter for the stdio transport
//! - `error.rs` / `output.rs` - typed errors and structured results
//!
//! ## Adding a New Tool
//!
//! 1. Create a params struct and a type implementing [`ToolDefinition`] in
//!    `definitions/<app>/`
//! 2. Register it in `definitions::register_builtin`
//!
//! Mutating tools set `MUTATING = true`, declare `ParamSpec::CONFIRM` and
//! route their write through `ToolContext::commit`.

mod bridge;
mod context;
pub mod definitions;
mod descriptor;
mod error;
mod output;
pub mod params;
mod registry;
pub mod router;

pub use bridge::ToolBridge;
pub use context::{ToolContext, WriteOp};
pub use descriptor::{
    ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition, ToolDescriptor,
};
pub use error::{ErrorBody, ToolError, ToolResult};
pub use output::ToolOutput;
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use router::{build_tool_router, to_mcp_result};
