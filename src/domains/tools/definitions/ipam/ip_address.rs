//! IP address creation.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::net::IpAddr;

use super::super::common::{FilterSet, check_choice, default_active, put_opt};
use crate::core::netbox::{Endpoint, ResourceRef};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

pub const IP_STATUSES: &[&str] = &["active", "reserved", "deprecated", "dhcp", "slaac"];

/// Validate `address/len` notation and return it in canonical form.
fn parse_cidr(address: &str) -> ToolResult<String> {
    let invalid = || {
        ToolError::validation(format!(
            "'{address}' is not an address in CIDR notation (e.g. 192.0.2.10/24)"
        ))
    };

    let (ip, len) = address.trim().split_once('/').ok_or_else(invalid)?;
    let ip: IpAddr = ip.parse().map_err(|_| invalid())?;
    let len: u8 = len.parse().map_err(|_| invalid())?;
    let max = if ip.is_ipv4() { 32 } else { 128 };
    if len > max {
        return Err(invalid());
    }
    Ok(format!("{ip}/{len}"))
}

/// Parameters for creating an IP address.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIpAddressParams {
    /// Address with prefix length, e.g. "10.0.0.5/24".
    pub address: String,

    #[serde(default = "default_active")]
    pub status: String,

    /// DNS name for the address.
    pub dns_name: Option<String>,

    /// Owning tenant (ID, slug or name).
    pub tenant: Option<ResourceRef>,

    pub description: Option<String>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateIpAddressTool;

impl ToolDefinition for CreateIpAddressTool {
    const NAME: &'static str = "netbox_create_ip_address";
    const CATEGORY: ToolCategory = ToolCategory::Ipam;
    const DESCRIPTION: &'static str = "Create an IP address in CIDR notation. Fails if the address already exists. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("address", ParamKind::String),
        ParamSpec::with_default("status", ParamKind::String, ParamDefault::Str("active")),
        ParamSpec::optional("dns_name", ParamKind::String),
        ParamSpec::optional("tenant", ParamKind::Reference),
        ParamSpec::optional("description", ParamKind::String),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateIpAddressParams;

    fn run(params: CreateIpAddressParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let address = parse_cidr(&params.address)?;
            check_choice("status", &params.status, IP_STATUSES)?;

            let client = ctx.client();
            client
                .ensure_absent(
                    Endpoint::IpAddresses,
                    &FilterSet::new().eq("address", &address).build(),
                    &address,
                )
                .await?;
            let tenant = client.resolve_opt(Endpoint::Tenants, params.tenant.as_ref()).await?;

            let mut payload = Map::new();
            payload.insert("address".into(), address.into());
            payload.insert("status".into(), params.status.into());
            put_opt(&mut payload, "dns_name", params.dns_name);
            put_opt(&mut payload, "tenant", tenant);
            put_opt(&mut payload, "description", params.description);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::IpAddresses,
                payload: Value::Object(payload),
            })
            .await
        }
        .boxed()
    }
}
