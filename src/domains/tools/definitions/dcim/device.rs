//! Device tools.
//!
//! Devices are addressed by name, optionally scoped to a site: NetBox only
//! enforces name uniqueness per site (and tenant), so a bare name can match
//! several devices. Such lookups fail with a validation error asking for the
//! site instead of picking one.

use futures::FutureExt;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::super::common::{
    FilterSet, check_choice, clamp_limit, default_active, default_limit, listing, put_opt, related,
    status_value,
};
use crate::core::netbox::{Endpoint, FieldSource, ResourceRef};
use crate::domains::tools::context::{ToolContext, WriteOp};
use crate::domains::tools::descriptor::{ParamDefault, ParamKind, ParamSpec, ToolCategory, ToolDefinition};
use crate::domains::tools::error::{ToolError, ToolResult};
use crate::domains::tools::output::ToolOutput;

pub const DEVICE_STATUSES: &[&str] = &[
    "offline",
    "active",
    "planned",
    "staged",
    "failed",
    "inventory",
    "decommissioning",
];

fn brief(device: &Value) -> Value {
    json!({
        "id": device.id(),
        "name": device.text("name"),
        "status": device.field("status").map(|s| status_value(&s)),
        "site": related(device, "site"),
        "role": related(device, "role"),
        "device_type": related(device, "device_type"),
        "tenant": related(device, "tenant"),
    })
}

/// Find exactly one device by name, optionally within a site.
///
/// `fresh` bypasses the read cache; used when the result is about to be
/// written to.
async fn find_device(
    ctx: &ToolContext,
    name: &str,
    site: Option<&ResourceRef>,
    fresh: bool,
) -> ToolResult<Value> {
    let filters = FilterSet::new()
        .eq("name", name)
        .related(ctx, "site", Endpoint::Sites, site)
        .await?
        .build();

    let client = ctx.client();
    let mut found = if fresh {
        client.list_fresh(Endpoint::Devices, &filters).await?
    } else {
        client.list(Endpoint::Devices, &filters).await?
    };

    let key = match site {
        Some(site) => format!("{name} (site {site})"),
        None => name.to_string(),
    };
    match found.len() {
        0 => Err(ToolError::NotFound {
            resource: "device".into(),
            key,
        }),
        1 => Ok(found.remove(0)),
        n => Err(ToolError::validation(format!(
            "{n} devices are named '{name}'; specify the site"
        ))),
    }
}

fn device_id(device: &Value) -> ToolResult<i64> {
    device
        .id()
        .ok_or_else(|| ToolError::Upstream(format!("device {} has no id", device.label())))
}

// ============================================================================
// netbox_list_devices
// ============================================================================

/// Parameters for listing devices.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListDevicesParams {
    /// Only devices at this site (ID, slug or name).
    pub site: Option<ResourceRef>,

    /// Only devices with this role (ID, slug or name).
    pub role: Option<ResourceRef>,

    /// Only devices with this status.
    pub status: Option<String>,

    /// Maximum number of devices returned.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub struct ListDevicesTool;

impl ToolDefinition for ListDevicesTool {
    const NAME: &'static str = "netbox_list_devices";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "List NetBox devices, optionally filtered by site, role and status.";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::optional("role", ParamKind::Reference),
        ParamSpec::optional("status", ParamKind::String),
        ParamSpec::with_default("limit", ParamKind::Integer, ParamDefault::Int(50)),
    ];

    type Params = ListDevicesParams;

    fn run(params: ListDevicesParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let filters = FilterSet::new()
                .related(&ctx, "site", Endpoint::Sites, params.site.as_ref())
                .await?
                .related(&ctx, "role", Endpoint::DeviceRoles, params.role.as_ref())
                .await?
                .opt("status", params.status.as_deref())
                .build();

            let devices = ctx.client().list(Endpoint::Devices, &filters).await?;
            let data = listing(devices, clamp_limit(params.limit), brief);
            let message = format!("Found {} device(s)", data["total"]);
            Ok(ToolOutput::success(data).with_message(message))
        }
        .boxed()
    }
}

// ============================================================================
// netbox_get_device
// ============================================================================

/// Parameters for fetching one device.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDeviceParams {
    /// Device name.
    pub name: String,

    /// Site the device is in, when the name alone is ambiguous.
    pub site: Option<ResourceRef>,
}

pub struct GetDeviceTool;

impl ToolDefinition for GetDeviceTool {
    const NAME: &'static str = "netbox_get_device";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Get a NetBox device by name, optionally scoped to a site.";
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::optional("site", ParamKind::Reference),
    ];

    type Params = GetDeviceParams;

    fn run(params: GetDeviceParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let device = find_device(&ctx, &params.name, params.site.as_ref(), false).await?;
            let message = format!("Found device {}", device.label());
            Ok(ToolOutput::success(device).with_message(message))
        }
        .boxed()
    }
}

// ============================================================================
// netbox_create_device
// ============================================================================

/// Parameters for creating a device.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateDeviceParams {
    /// Device name, unique within the site.
    pub name: String,

    /// Device type (ID, slug or model).
    pub device_type: ResourceRef,

    /// Device role (ID, slug or name).
    pub role: ResourceRef,

    /// Site (ID, slug or name).
    pub site: ResourceRef,

    #[serde(default = "default_active")]
    pub status: String,

    /// Owning tenant (ID, slug or name).
    pub tenant: Option<ResourceRef>,

    /// Serial number.
    pub serial: Option<String>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct CreateDeviceTool;

impl ToolDefinition for CreateDeviceTool {
    const NAME: &'static str = "netbox_create_device";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Create a device. Device type, role, site and tenant may be given by ID, slug or name. Fails if the site already has a device with that name. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::required("device_type", ParamKind::Reference),
        ParamSpec::required("role", ParamKind::Reference),
        ParamSpec::required("site", ParamKind::Reference),
        ParamSpec::with_default("status", ParamKind::String, ParamDefault::Str("active")),
        ParamSpec::optional("tenant", ParamKind::Reference),
        ParamSpec::optional("serial", ParamKind::String),
        ParamSpec::CONFIRM,
    ];

    type Params = CreateDeviceParams;

    fn run(params: CreateDeviceParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            check_choice("status", &params.status, DEVICE_STATUSES)?;

            let client = ctx.client();
            let site = client.resolve(Endpoint::Sites, &params.site).await?;
            let device_type = client.resolve(Endpoint::DeviceTypes, &params.device_type).await?;
            let role = client.resolve(Endpoint::DeviceRoles, &params.role).await?;
            let tenant = client.resolve_opt(Endpoint::Tenants, params.tenant.as_ref()).await?;

            let existing = FilterSet::new()
                .eq("name", &params.name)
                .eq("site_id", site)
                .build();
            client
                .ensure_absent(
                    Endpoint::Devices,
                    &existing,
                    &format!("{} (site {})", params.name, params.site),
                )
                .await?;

            let mut payload = Map::new();
            payload.insert("name".into(), params.name.into());
            payload.insert("device_type".into(), device_type.into());
            payload.insert("role".into(), role.into());
            payload.insert("site".into(), site.into());
            payload.insert("status".into(), params.status.into());
            put_opt(&mut payload, "tenant", tenant);
            put_opt(&mut payload, "serial", params.serial);

            ctx.commit(WriteOp::Create {
                endpoint: Endpoint::Devices,
                payload: Value::Object(payload),
            })
            .await
        }
        .boxed()
    }
}

// ============================================================================
// netbox_update_device_status
// ============================================================================

/// Parameters for changing a device's status.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateDeviceStatusParams {
    /// Device name.
    pub name: String,

    /// New status.
    pub status: String,

    /// Site the device is in, when the name alone is ambiguous.
    pub site: Option<ResourceRef>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct UpdateDeviceStatusTool;

impl ToolDefinition for UpdateDeviceStatusTool {
    const NAME: &'static str = "netbox_update_device_status";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Change the status of a device. A device already in the requested status is left untouched. Returns a preview unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::required("status", ParamKind::String),
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::CONFIRM,
    ];

    type Params = UpdateDeviceStatusParams;

    fn run(params: UpdateDeviceStatusParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            check_choice("status", &params.status, DEVICE_STATUSES)?;

            let device = find_device(&ctx, &params.name, params.site.as_ref(), true).await?;
            let current = device.field("status").map(|s| status_value(&s));
            if current.as_ref().and_then(Value::as_str) == Some(params.status.as_str()) {
                return Ok(ToolOutput::success(json!({
                    "action": "none",
                    "resource": "device",
                    "object": device,
                }))
                .with_message(format!("Device {} is already {}", params.name, params.status)));
            }

            ctx.commit(WriteOp::Update {
                endpoint: Endpoint::Devices,
                id: device_id(&device)?,
                current: device,
                changes: json!({"status": params.status}),
            })
            .await
        }
        .boxed()
    }
}

// ============================================================================
// netbox_delete_device
// ============================================================================

/// Parameters for deleting a device.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteDeviceParams {
    /// Device name.
    pub name: String,

    /// Site the device is in, when the name alone is ambiguous.
    pub site: Option<ResourceRef>,

    /// Apply the change. Without it a preview is returned.
    #[serde(default)]
    pub confirm: bool,
}

pub struct DeleteDeviceTool;

impl ToolDefinition for DeleteDeviceTool {
    const NAME: &'static str = "netbox_delete_device";
    const CATEGORY: ToolCategory = ToolCategory::Dcim;
    const DESCRIPTION: &'static str = "Delete a device. Returns a preview of the device that would be removed unless confirm=true.";
    const MUTATING: bool = true;
    const PARAMS: &'static [ParamSpec] = &[
        ParamSpec::required("name", ParamKind::String),
        ParamSpec::optional("site", ParamKind::Reference),
        ParamSpec::CONFIRM,
    ];

    type Params = DeleteDeviceParams;

    fn run(params: DeleteDeviceParams, ctx: ToolContext) -> BoxFuture<'static, ToolResult<ToolOutput>> {
        async move {
            let device = find_device(&ctx, &params.name, params.site.as_ref(), true).await?;
            ctx.commit(WriteOp::Delete {
                endpoint: Endpoint::Devices,
                id: device_id(&device)?,
                current: device,
            })
            .await
        }
        .boxed()
    }
}
