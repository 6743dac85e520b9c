/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything a resource needs to destroy itself:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue family the command pools are created for

use ash::vk;
use gpu_allocator::vulkan::{Allocation, Allocator};
use std::sync::Mutex;
use hd_bridge::hdbridge::Result;
use hd_bridge::{engine_err, engine_warn};

/// Shared GPU context for all Vulkan resources.
///
/// Shared (via `Arc`) by images, buffers, shaders, pipelines and command lists.
///
/// Note: device and instance destruction is handled by
/// `VulkanGraphicsDevice::drop()`, which also takes the allocator out of the
/// slot so its memory pages are freed while the device is still alive.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator. `None` once the owning device has shut down.
    allocator: Mutex<Option<Allocator>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Alignment for flush/invalidate of non-coherent memory
    pub non_coherent_atom_size: vk::DeviceSize,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        non_coherent_atom_size: vk::DeviceSize,
    ) -> Self {
        Self {
            device,
            allocator: Mutex::new(Some(allocator)),
            graphics_queue,
            graphics_queue_family,
            non_coherent_atom_size: non_coherent_atom_size.max(1),
        }
    }

    /// Run `f` with the allocator locked
    ///
    /// Fails when the allocator lock is poisoned or the device already shut down.
    pub fn with_allocator<T>(
        &self,
        f: impl FnOnce(&mut Allocator) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.allocator.lock().map_err(|_| {
            engine_err!("hdbridge::vulkan", "GPU allocator lock poisoned")
        })?;

        match guard.as_mut() {
            Some(allocator) => f(allocator),
            None => Err(engine_err!("hdbridge::vulkan", "GPU allocator used after device shutdown")),
        }
    }

    /// Return an allocation to the allocator
    ///
    /// Never panics: a resource outliving its device only leaks its memory.
    pub fn free(&self, allocation: Allocation) {
        match self.allocator.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(allocator) => {
                    allocator.free(allocation).ok();
                }
                None => {
                    engine_warn!("hdbridge::vulkan", "Allocation freed after device shutdown");
                }
            },
            Err(_) => {
                engine_warn!("hdbridge::vulkan", "Allocation leaked: allocator lock poisoned");
            }
        }
    }

    /// Take the allocator out of the context (device shutdown)
    pub(crate) fn shutdown_allocator(&self) {
        let allocator = match self.allocator.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(allocator);
    }
}
