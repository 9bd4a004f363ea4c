//! Tool definitions module.
//!
//! One type per tool, grouped by NetBox app. Each implements
//! [`ToolDefinition`](super::descriptor::ToolDefinition); adding a tool means
//! writing the type and registering it in [`register_builtin`].

pub(crate) mod common;
pub mod dcim;
pub mod ipam;
pub mod system;
pub mod tenancy;

pub use dcim::*;
pub use ipam::*;
pub use system::*;
pub use tenancy::*;

use super::registry::ToolRegistryBuilder;

/// Register every built-in tool, in listing order.
pub fn register_builtin(builder: ToolRegistryBuilder) -> ToolRegistryBuilder {
    builder
        .register::<HealthCheckTool>()
        .register::<ListSitesTool>()
        .register::<GetSiteTool>()
        .register::<CreateSiteTool>()
        .register::<CreateManufacturerTool>()
        .register::<ListDevicesTool>()
        .register::<GetDeviceTool>()
        .register::<CreateDeviceTool>()
        .register::<UpdateDeviceStatusTool>()
        .register::<DeleteDeviceTool>()
        .register::<ListPrefixesTool>()
        .register::<CreateIpAddressTool>()
        .register::<CreateVlanTool>()
        .register::<ListTenantsTool>()
        .register::<CreateTenantTool>()
}
