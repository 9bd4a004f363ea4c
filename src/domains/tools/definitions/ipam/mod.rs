//! IPAM tools: prefixes, IP addresses and VLANs.

mod ip_address;
mod prefix;
mod vlan;

pub use ip_address::{CreateIpAddressParams, CreateIpAddressTool};
pub use prefix::{ListPrefixesParams, ListPrefixesTool};
pub use vlan::{CreateVlanParams, CreateVlanTool};
