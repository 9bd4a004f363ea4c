//! Server and NetBox diagnostics.

mod health;

pub use health::{HealthCheckParams, HealthCheckTool};
