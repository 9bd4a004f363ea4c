//! Tenant tools.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::super::common::{FilterSet, clamp_limit, default_limit, listing, put_opt};
use crate::core::netbox::{Endpoint, FieldSource, slugify};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

/// Parameters for listing tenants.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTenantsParams {
    /// Maximum number of tenants returned.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub struct ListTenantsTool;

impl ToolDefinition for ListTenantsTool {
    const NAME: &'static str = "netbox_list_tenants";
    const CATEGORY: ToolCategory = ToolCategory::Tenancy;
    const DESCRIPTION: &'static str = "List NetBox tenants.";
    const PARAMS: &'static [ParamSpec] =
        &[ParamSpec::with_default("limit", ParamKind::Integer, ParamDefault::Int(50))];

    type Params = ListTenantsParams;

    fn run(params: ListTenantsParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let tenants = ctx.client().list(Endpoint::Tenants, &Vec::new()).await?;
            let data = listing(tenants, clamp_limit(params.limit), |t| {
                json!({
                    "id": t.id(),
                    "name": t.text("name"),
                    "slug": t.text("slug"),
                    "description": t.text("description"),
                })
            });
            let message = format!("Found {} tenant(s)", data["total"]);
            Ok(ToolOutput::success(data).with_message(message))
        }
        .boxed()
    }
}

/// Parameters for creating a tenant.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTenantParams {
    /// Tenant name.
    pub name: String,

    /// URL-friendly identifier. Derived from the name when omitted.
    pub slug: Option<String>,

    pub description: Option<String>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateTenantTool;

impl ToolDefinition for CreateTenantTool {
    const NAME: &'static str = "netbox_create_tenant";
    const CATEGORY: ToolCategory = ToolCategory::Tenancy;
    const DESCRIPTION: &'static str = "Create a tenant. Fails if one with the same slug or name exists. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::optional("slug", ParamKind::String),
        ParamSpec::optional("description", ParamKind::String),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateTenantParams;

    fn run(params: CreateTenantParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let slug = params.slug.unwrap_or_else(|| slugify(&params.name));
            if slug.is_empty() {
                return Err(ToolError::validation(format!(
                    "cannot derive a slug from name '{}'",
                    params.name
                )));
            }

            for (field, key) in [("slug", &slug), ("name", &params.name)] {
                ctx.client()
                    .ensure_absent(Endpoint::Tenants, &FilterSet::new().eq(field, key).build(), key)
                    .await?;
            }

            let mut payload = Map::new();
            payload.insert("name".into(), params.name.into());
            payload.insert("slug".into(), slug.into());
            put_opt(&mut payload, "description", params.description);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::Tenants,
                payload: Value::Object(payload),
            })
            .await
        }
        .boxed()
    }
}
