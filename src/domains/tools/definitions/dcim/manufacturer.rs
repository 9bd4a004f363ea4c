//! Manufacturer creation.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::super::common::{FilterSet, put_opt};
use crate::core::netbox::{Endpoint, slugify};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

/// Parameters for creating a manufacturer.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateManufacturerParams {
    /// Manufacturer name (e.g. "Juniper").
    pub name: String,

    /// URL-friendly identifier. Derived from the name when omitted.
    pub slug: Option<String>,

    pub description: Option<String>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateManufacturerTool;

impl ToolDefinition for CreateManufacturerTool {
    const NAME: &'static str = "netbox_create_manufacturer";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Create a device manufacturer. Fails if one with the same slug or name exists. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::optional("slug", ParamKind::String),
        ParamSpec::optional("description", ParamKind::String),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateManufacturerParams;

    fn run(params: CreateManufacturerParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
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
                    .ensure_absent(Endpoint::Manufacturers, &FilterSet::new().eq(field, key).build(), key)
                    .await?;
            }

            let mut payload = Map::new();
            payload.insert("name".into(), params.name.into());
            payload.insert("slug".into(), slug.into());
            put_opt(&mut payload, "description", params.description);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::Manufacturers,
                payload: Value::Object(payload),
            })
            .await
        }
        .boxed()
    }
}
