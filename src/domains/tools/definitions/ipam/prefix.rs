//! Prefix listing.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use super::super::common::{FilterSet, clamp_limit, default_limit, listing, related, status_value};
use crate::core::netbox::{Endpoint, FieldSource, ResourceRef};
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::ToolResult;
use crate::domains::tools::output::ToolOutput;

fn brief(prefix: &Value) -> Value {
    json!({
        "id": prefix.id(),
        "prefix": prefix.text("prefix"),
        "status": prefix.field("status").map(|s| status_value(&s)),
        "site": related(prefix, "site"),
        "vlan": related(prefix, "vlan"),
        "tenant": related(prefix, "tenant"),
        "description": prefix.text("description"),
    })
}

/// Parameters for listing prefixes.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListPrefixesParams {
    /// Only prefixes assigned to this site (ID, slug or name).
    pub site: Option<ResourceRef>,

    /// Only prefixes with this status (e.g. "active", "container").
    pub status: Option<String>,

    /// Maximum number of prefixes returned.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub struct ListPrefixesTool;

impl ToolDefinition for ListPrefixesTool {
    const NAME: &'static str = "netbox_list_prefixes";
    const CATEGORY: ToolCategory = ToolCategory::Ipam;
    const DESCRIPTION: &'static str = "List IP prefixes, optionally filtered by site and status.";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::optional("status", ParamKind::String),
        ParamSpec::with_default("limit", ParamKind::Integer, ParamDefault::Int(50)),
    ];

    type Params = ListPrefixesParams;

    fn run(params: ListPrefixesParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let filters = FilterSet::new()
                .related(&ctx, "site", Endpoint::Sites, params.site.as_ref())
                .await?
                .opt("status", params.status.as_deref())
                .build();

            let prefixes = ctx.client().list(Endpoint::Prefixes, &filters).await?;
            let data = listing(prefixes, clamp_limit(params.limit), brief);
            let message = format!("Found {} prefix(es)", data["total"]);
            Ok(ToolOutput::success(data).with_message(message))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::netbox::testing::InMemoryNetBox;
    use crate::domains::tools::definitions::common::test_context;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_prefixes() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        backend.insert(Endpoint::Prefixes, json!({"prefix": "10.1.0.0/16", "status": "container"}));

        let run = |site: Option<ResourceRef>, status: Option<&str>| {
            let params = ListPrefixesParams {
                site,
                status: status.map(str::to_string),
                limit: 50,
            };
            ListPrefixesTool::run(params, test_context(backend.clone(), ListPrefixesTool::NAME, false))
        };

        let out = run(None, None).await.unwrap();
        assert_eq!(out.data["total"], 2);

        let out = run(Some("dc1".into()), None).await.unwrap();
        assert_eq!(out.data["count"], 1);
        assert_eq!(out.data["results"][0]["prefix"], "10.0.0.0/24");
        assert_eq!(out.data["results"][0]["site"]["id"], 1);

        let out = run(None, Some("container")).await.unwrap();
        assert_eq!(out.data["results"][0]["prefix"], "10.1.0.0/16");
        assert_eq!(out.data["results"][0]["site"], Value::Null);

        let err = run(Some("dc9".into()), None).await.unwrap_err();
        assert_eq!(err.tag(), "not_found");
    }
}
