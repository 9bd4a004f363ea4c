//! VLAN creation.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::super::common::{FilterSet, check_choice, default_active, put_opt};
use crate::core::netbox::{Endpoint, FieldSource, ResourceRef};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

pub const VLAN_STATUSES: &[&str] = &["active", "reserved", "deprecated"];

/// Parameters for creating a VLAN.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateVlanParams {
    /// VLAN name.
    pub name: String,

    /// 802.1Q VLAN ID (1-4094).
    pub vid: i64,

    /// Site the VLAN belongs to (ID, slug or name). Global when omitted.
    pub site: Option<ResourceRef>,

    #[serde(default = "default_active")]
    pub status: String,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateVlanTool;

impl ToolDefinition for CreateVlanTool {
    const NAME: &'static str = "netbox_create_vlan";
    const CATEGORY: ToolCategory = ToolCategory::Ipam;
    const DESCRIPTION: &'static str = "Create a VLAN, optionally scoped to a site. Fails if the VLAN ID or name is already used in that scope. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::required("vid", ParamKind::Integer),
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::with_default("status", ParamKind::String, ParamDefault::Str("active")),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateVlanParams;

    fn run(params: CreateVlanParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            if !(1..=4094).contains(&params.vid) {
                return Err(ToolError::validation(format!(
                    "VLAN ID {} is out of range (1-4094)",
                    params.vid
                )));
            }
            check_choice("status", &params.status, VLAN_STATUSES)?;

            let client = ctx.client();
            let site = client.resolve_opt(Endpoint::Sites, params.site.as_ref()).await?;
            let scope = match &params.site {
                Some(site) => format!("site {site}"),
                None => "global scope".to_string(),
            };

            // Global VLANs are those without a site; NetBox has no portable
            // "site is null" filter, so the scope is checked on the results.
            for (field, value) in [("vid", params.vid.to_string()), ("name", params.name.clone())] {
                let filters = FilterSet::new().eq(field, &value);
                let filters = match site {
                    Some(id) => filters.eq("site_id", id),
                    None => filters,
                }
                .build();

                let clash = client
                    .list_fresh(Endpoint::Vlans, &filters)
                    .await?
                    .into_iter()
                    .any(|vlan| vlan.related_id("site") == site);
                if clash {
                    return Err(ToolError::Conflict {
                        resource: "VLAN".into(),
                        key: format!("{field} {value} in {scope}"),
                    });
                }
            }

            let mut payload = Map::new();
            payload.insert("name".into(), params.name.into());
            payload.insert("vid".into(), params.vid.into());
            payload.insert("status".into(), params.status.into());
            put_opt(&mut payload, "site", site);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::Vlans,
                payload: Value::Object(payload),
            })
            .await
        }
        .boxed()
    }
}
