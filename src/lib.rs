//! NetBox MCP Server Library
//!
//! Exposes safety-gated NetBox operations as Model Context Protocol tools.
//! Write tools only touch NetBox when called with `confirm=true`; otherwise
//! they return a dry-run preview.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the NetBox client (cache,
//!   retries, reference resolution), metrics, the server and its transports
//! - **domains**: the tools themselves, their registry and the dispatch
//!   bridge shared by every transport
//!
//! # Example
//!
//! ```rust,no_run
//! use netbox_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
