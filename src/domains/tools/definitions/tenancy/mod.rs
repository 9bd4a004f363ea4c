//! Tenancy tools.

mod tenant;

pub use tenant::{CreateTenantParams, CreateTenantTool, ListTenantsParams, ListTenantsTool};
