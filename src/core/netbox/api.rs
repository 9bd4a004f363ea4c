//! NetBox API surface: endpoints and the backend trait.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use super::error::NetBoxResult;

/// Query filters sent to a NetBox list endpoint (`?key=value&...`).
pub type Filters = Vec<(String, String)>;

/// NetBox object types this server knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sites,
    Manufacturers,
    DeviceTypes,
    DeviceRoles,
    Devices,
    Interfaces,
    IpAddresses,
    Prefixes,
    Vlans,
    Tenants,
}

impl Endpoint {
    /// Path below `/api/`, without slashes.
    pub fn path(self) -> &'static str {
        match self {
            Self::Sites => "dcim/sites",
            Self::Manufacturers => "dcim/manufacturers",
            Self::DeviceTypes => "dcim/device-types",
            Self::DeviceRoles => "dcim/device-roles",
            Self::Devices => "dcim/devices",
            Self::Interfaces => "dcim/interfaces",
            Self::IpAddresses => "ipam/ip-addresses",
            Self::Prefixes => "ipam/prefixes",
            Self::Vlans => "ipam/vlans",
            Self::Tenants => "tenancy/tenants",
        }
    }

    /// Human label used in messages ("site", "device type", ...).
    pub fn label(self) -> &'static str {
        match self {
            Self::Sites => "site",
            Self::Manufacturers => "manufacturer",
            Self::DeviceTypes => "device type",
            Self::DeviceRoles => "device role",
            Self::Devices => "device",
            Self::Interfaces => "interface",
            Self::IpAddresses => "IP address",
            Self::Prefixes => "prefix",
            Self::Vlans => "VLAN",
            Self::Tenants => "tenant",
        }
    }

    /// Fields tried, in order, when resolving a human key to an ID.
    pub fn key_fields(self) -> &'static [&'static str] {
        match self {
            Self::Sites | Self::Manufacturers | Self::DeviceRoles | Self::Tenants => {
                &["slug", "name"]
            }
            Self::DeviceTypes => &["slug", "model"],
            Self::Devices | Self::Interfaces | Self::Vlans => &["name"],
            Self::IpAddresses => &["address"],
            Self::Prefixes => &["prefix"],
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Backend seam for the NetBox REST API.
///
/// `HttpNetBoxApi` talks to a real NetBox instance; tests swap in an
/// in-memory implementation.
#[async_trait]
pub trait NetBoxApi: Send + Sync {
    /// List objects matching `filters`, following pagination.
    async fn list(&self, endpoint: Endpoint, filters: &Filters) -> NetBoxResult<Vec<Value>>;

    /// Fetch a single object by ID.
    async fn get(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<Value>;

    /// Create an object and return its representation.
    async fn create(&self, endpoint: Endpoint, body: &Value) -> NetBoxResult<Value>;

    /// Partially update (PATCH) an object and return its representation.
    async fn update(&self, endpoint: Endpoint, id: i64, body: &Value) -> NetBoxResult<Value>;

    /// Delete an object.
    async fn delete(&self, endpoint: Endpoint, id: i64) -> NetBoxResult<()>;

    /// NetBox `/api/status/` payload.
    async fn status(&self) -> NetBoxResult<Value>;
}
