/// Driver handles offered by the host and device ownership resolution

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::device::GraphicsDevice;
use crate::{engine_debug, engine_info};

/// Token a host uses to hand its own device to this engine
pub const DEVICE_BINDING_TOKEN: &str = "CustomVulkanDevice";

// ============================================================================
// Drivers
// ============================================================================

/// What a host driver carries
#[derive(Clone)]
pub enum DriverPayload {
    /// A device this engine can render with
    Device(Arc<Mutex<dyn GraphicsDevice>>),
    /// Anything else (e.g. a handle for another renderer)
    Opaque(Arc<dyn Any + Send + Sync>),
}

/// One driver handle offered by the host
#[derive(Clone)]
pub struct Driver {
    pub name: String,
    pub payload: DriverPayload,
}

impl Driver {
    pub fn device(name: impl Into<String>, device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            name: name.into(),
            payload: DriverPayload::Device(device),
        }
    }

    pub fn opaque(name: impl Into<String>, payload: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            payload: DriverPayload::Opaque(payload),
        }
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.payload {
            DriverPayload::Device(_) => "Device",
            DriverPayload::Opaque(_) => "Opaque",
        };
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("payload", &kind)
            .finish()
    }
}

// ============================================================================
// Device factory
// ============================================================================

/// Creates the devices this engine owns when the host offers none
///
/// Implemented by each backend (e.g. `VulkanDeviceFactory`).
pub trait DeviceFactory: Send + Sync {
    /// Backend the factory creates devices for; host devices must match it
    fn backend_name(&self) -> &'static str;

    /// Create a device with no presentation surface
    fn create_headless(&self) -> Result<Arc<Mutex<dyn GraphicsDevice>>>;
}

// ============================================================================
// Device handle
// ============================================================================

/// How finished frames reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// Same device as the host: copy into the host backbuffer on the GPU
    Direct,
    /// Own device: read back to the CPU and upload into the host context
    Manual,
}

/// Device a render pass works with, tagged with who owns it
#[derive(Clone)]
pub enum DeviceHandle {
    /// Created by this engine, headless
    Owned(Arc<Mutex<dyn GraphicsDevice>>),
    /// Supplied by the host, outlives every render pass
    Borrowed(Arc<Mutex<dyn GraphicsDevice>>),
}

impl DeviceHandle {
    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        match self {
            DeviceHandle::Owned(device) | DeviceHandle::Borrowed(device) => device,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, DeviceHandle::Owned(_))
    }

    /// Fixed for the lifetime of the handle
    pub fn presentation_mode(&self) -> PresentationMode {
        match self {
            DeviceHandle::Owned(_) => PresentationMode::Manual,
            DeviceHandle::Borrowed(_) => PresentationMode::Direct,
        }
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceHandle::Owned(_) => write!(f, "DeviceHandle::Owned"),
            DeviceHandle::Borrowed(_) => write!(f, "DeviceHandle::Borrowed"),
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Pick the host device offered under `token`, or create an owned one
///
/// The search is best effort: a driver with the right name but the wrong
/// payload (opaque, or a device of another backend) is skipped.
pub fn resolve_device(
    drivers: &[Driver],
    token: &str,
    factory: &dyn DeviceFactory,
) -> Result<DeviceHandle> {
    let backend = factory.backend_name();

    for driver in drivers.iter().filter(|d| d.name == token) {
        match &driver.payload {
            DriverPayload::Device(device) => {
                let device_backend = match device.lock() {
                    Ok(guard) => guard.backend_name(),
                    Err(_) => {
                        engine_debug!("hdbridge::RenderDelegate",
                            "Driver '{}' holds a poisoned device, skipping", driver.name);
                        continue;
                    }
                };
                if device_backend == backend {
                    engine_info!("hdbridge::RenderDelegate",
                        "Using host device from driver '{}' ({})", driver.name, backend);
                    return Ok(DeviceHandle::Borrowed(device.clone()));
                }
                engine_debug!("hdbridge::RenderDelegate",
                    "Driver '{}' holds a '{}' device, expected '{}', skipping",
                    driver.name, device_backend, backend);
            }
            DriverPayload::Opaque(_) => {
                engine_debug!("hdbridge::RenderDelegate",
                    "Driver '{}' does not hold a device, skipping", driver.name);
            }
        }
    }

    engine_info!("hdbridge::RenderDelegate",
        "No host device offered, creating a headless '{}' device", backend);
    Ok(DeviceHandle::Owned(factory.create_headless()?))
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
