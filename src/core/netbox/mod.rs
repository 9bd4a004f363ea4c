//! NetBox REST API client layer.
//!
//! - `api` - endpoint catalogue and the [`NetBoxApi`] backend trait
//! - `http_api` - reqwest implementation with token auth, pagination and retries
//! - `client` - the shared [`NetBoxClient`]: cached reads, fresh conflict
//!   checks, reference resolution, cache-invalidating writes
//! - `cache` - TTL response cache
//! - `record` - shape-tolerant field access over NetBox objects

mod api;
mod cache;
mod client;
mod error;
mod http_api;
mod record;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{Endpoint, Filters, NetBoxApi};
pub use cache::{CacheStats, ResponseCache};
pub use client::NetBoxClient;
pub use error::{NetBoxError, NetBoxResult};
pub use http_api::HttpNetBoxApi;
pub use record::{FieldSource, Record, ResourceRef, parse_page, related_id, slugify};
