//! Site tools: list, get and create.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::super::common::{
    FilterSet, check_choice, clamp_limit, default_active, default_limit, listing, put_opt, related,
    status_value,
};
use crate::core::netbox::{Endpoint, FieldSource, ResourceRef, slugify};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

pub const SITE_STATUSES: &[&str] = &["planned", "staging", "active", "decommissioning", "retired"];

fn brief(site: &Value) -> Value {
    json!({
        "id": site.id(),
        "name": site.text("name"),
        "slug": site.text("slug"),
        "status": site.field("status").map(|s| status_value(&s)),
        "tenant": related(site, "tenant"),
    })
}

// ============================================================================
// netbox_list_sites
// ============================================================================

/// Parameters for listing sites.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListSitesParams {
    /// Only sites with this status (e.g. "active", "planned").
    pub status: Option<String>,

    /// Maximum number of sites returned.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub struct ListSitesTool;

impl ToolDefinition for ListSitesTool {
    const NAME: &'static str = "netbox_list_sites";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "List NetBox sites, optionally filtered by status.";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::optional("status", ParamKind::String),
        ParamSpec::with_default("limit", ParamKind::Integer, ParamDefault::Int(50)),
    ];

    type Params = ListSitesParams;

    fn run(params: ListSitesParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let filters = FilterSet::new().opt("status", params.status.as_deref()).build();
            let sites = ctx.client().list(Endpoint::Sites, &filters).await?;
            let data = listing(sites, clamp_limit(params.limit), brief);
            let message = format!("Found {} site(s)", data["total"]);
            Ok(ToolOutput::success(data).with_message(message))
        }
        .boxed()
    }
}

// ============================================================================
// netbox_get_site
// ============================================================================

/// Parameters for fetching one site.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetSiteParams {
    /// Site ID, slug or name.
    pub site: ResourceRef,
}

pub struct GetSiteTool;

impl ToolDefinition for GetSiteTool {
    const NAME: &'static str = "netbox_get_site";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Get a NetBox site by ID, slug or name.";
    const PARAMS: &'static [ParamSpec] = &[ParamSpec::required("site", ParamKind::Reference)];

    type Params = GetSiteParams;

    fn run(params: GetSiteParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let site = ctx.client().lookup(Endpoint::Sites, &params.site).await?;
            let message = format!("Found site {}", site.label());
            Ok(ToolOutput::success(site).with_message(message))
        }
        .boxed()
    }
}

// ============================================================================
// netbox_create_site
// ============================================================================

/// Parameters for creating a site.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateSiteParams {
    /// Site name.
    pub name: String,

    /// URL-friendly identifier. Derived from the name when omitted.
    pub slug: Option<String>,

    /// Operational status.
    #[serde(default = "default_active")]
    pub status: String,

    pub description: Option<String>,

    /// Owning tenant (ID, slug or name).
    pub tenant: Option<ResourceRef>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateSiteTool;

impl ToolDefinition for CreateSiteTool {
    const NAME: &'static str = "netbox_create_site";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Create a NetBox site. Fails if a site with the same slug or name exists. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::optional("slug", ParamKind::String),
        ParamSpec::with_default("status", ParamKind::String, ParamDefault::Str("active")),
        ParamSpec::optional("description", ParamKind::String),
        ParamSpec::optional("tenant", ParamKind::Reference),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateSiteParams;

    fn run(params: CreateSiteParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            check_choice("status", &params.status, SITE_STATUSES)?;
            let slug = params.slug.unwrap_or_else(|| slugify(&params.name));
            if slug.is_empty() {
                return Err(ToolError::validation(format!(
                    "cannot derive a slug from name '{}'",
                    params.name
                )));
            }

            let client = ctx.client();
            client
                .ensure_absent(Endpoint::Sites, &FilterSet::new().eq("slug", &slug).build(), &slug)
                .await?;
            client
                .ensure_absent(
                    Endpoint::Sites,
                    &FilterSet::new().eq("name", &params.name).build(),
                    &params.name,
                )
                .await?;
            let tenant = client.resolve_opt(Endpoint::Tenants, params.tenant.as_ref()).await?;

            let mut payload = Map::new();
            payload.insert("name".into(), params.name.into());
            payload.insert("slug".into(), slug.into());
            payload.insert("status".into(), params.status.into());
            put_opt(&mut payload, "description", params.description);
            put_opt(&mut payload, "tenant", tenant);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::Sites,
                payload: Value::Object(payload),
            })
            .await
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

    fn create(name: &str, confirm: bool) -> CreateSiteParams {
        CreateSiteParams {
            name: name.to_string(),
            slug: None,
            status: default_active(),
            description: None,
            tenant: Some("acme".into()),
            confirm,
        }
    }

    #[tokio::test]
    async fn test_list_sites_filters_status() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let params = ListSitesParams {
            status: Some("planned".into()),
            limit: 50,
        };
        let out = ListSitesTool::run(params, test_context(backend, ListSitesTool::NAME, false))
            .await
            .unwrap();
        assert_eq!(out.data["count"], 1);
        assert_eq!(out.data["results"][0]["slug"], "dc2");
    }

    #[tokio::test]
    async fn test_get_site_by_any_key() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        for site in [ResourceRef::Id(1), "dc1".into(), "DC 1".into()] {
            let ctx = test_context(backend.clone(), GetSiteTool::NAME, false);
            let out = GetSiteTool::run(GetSiteParams { site }, ctx).await.unwrap();
            assert_eq!(out.data["id"], 1);
        }

        let ctx = test_context(backend, GetSiteTool::NAME, false);
        let err = GetSiteTool::run(GetSiteParams { site: "dc9".into() }, ctx)
            .await
            .unwrap_err();
        assert_eq!(err.tag(), "not_found");
    }

    #[tokio::test]
    async fn test_create_site_preview_resolves_tenant() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let ctx = test_context(backend.clone(), CreateSiteTool::NAME, false);
        let out = CreateSiteTool::run(create("Lab West", false), ctx).await.unwrap();

        assert!(out.dry_run);
        assert_eq!(out.data["payload"]["slug"], "lab-west");
        assert_eq!(out.data["payload"]["tenant"], 1);
        assert_eq!(backend.mutations(), 0);
    }

    #[tokio::test]
    async fn test_create_site_confirmed() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let ctx = test_context(backend.clone(), CreateSiteTool::NAME, true);
        let out = CreateSiteTool::run(create("Lab West", true), ctx).await.unwrap();

        assert!(!out.dry_run);
        assert_eq!(backend.mutations(), 1);
        assert_eq!(out.data["object"]["tenant"]["id"], 1);
    }

    #[tokio::test]
    async fn test_create_site_conflicts() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        for name in ["DC 1", "dc1"] {
            let ctx = test_context(backend.clone(), CreateSiteTool::NAME, true);
            let err = CreateSiteTool::run(create(name, true), ctx).await.unwrap_err();
            assert_eq!(err.tag(), "conflict", "{name}");
        }
        assert_eq!(backend.mutations(), 0);
    }

    #[tokio::test]
    async fn test_create_site_rejects_bad_status() {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let mut params = create("Lab", false);
        params.status = "open".into();
        let ctx = test_context(backend, CreateSiteTool::NAME, false);
        let err = CreateSiteTool::run(params, ctx).await.unwrap_err();
        assert_eq!(err.tag(), "validation");
    }
}
