//! DCIM tools: sites, manufacturers and devices.

mod device;
mod manufacturer;
mod site;

pub use device::{
    CreateDeviceParams, CreateDeviceTool, DeleteDeviceParams, DeleteDeviceTool, GetDeviceParams,
    GetDeviceTool, ListDevicesParams, ListDevicesTool, UpdateDeviceStatusParams,
    UpdateDeviceStatusTool,
};
pub use manufacturer::{CreateManufacturerParams, CreateManufacturerTool};
pub use site::{
    CreateSiteParams, CreateSiteTool, GetSiteParams, GetSiteTool, ListSitesParams, ListSitesTool,
};
