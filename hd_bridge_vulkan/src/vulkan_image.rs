/// VulkanImage - Vulkan implementation of the Image trait

use hd_bridge::hdbridge::device::{Image, ImageInfo};
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan image implementation
///
/// Either owned (created by the device, destroyed on drop) or imported from
/// the host (a backbuffer the host keeps ownership of).
pub struct VulkanImage {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation (None for imported images)
    pub(crate) allocation: Option<Allocation>,
    /// Whether drop destroys the Vulkan handles
    owned: bool,
    /// Read-only image properties
    pub(crate) info: ImageInfo,
}

impl VulkanImage {
    pub(crate) fn owned(
        ctx: Arc<GpuContext>,
        image: vk::Image,
        view: vk::ImageView,
        allocation: Allocation,
        info: ImageInfo,
    ) -> Self {
        Self {
            ctx,
            image,
            view,
            allocation: Some(allocation),
            owned: true,
            info,
        }
    }

    pub(crate) fn imported(
        ctx: Arc<GpuContext>,
        image: vk::Image,
        view: vk::ImageView,
        info: ImageInfo,
    ) -> Self {
        Self {
            ctx,
            image,
            view,
            allocation: None,
            owned: false,
            info,
        }
    }

    /// True if this wraps a host image
    pub fn is_imported(&self) -> bool {
        !self.owned
    }

    /// Downcast an engine image to the Vulkan type
    ///
    /// # Safety
    ///
    /// `image` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(image: &dyn Image) -> &VulkanImage {
        &*(image as *const dyn Image as *const VulkanImage)
    }
}

impl Image for VulkanImage {
    fn info(&self) -> &ImageInfo {
        &self.info
    }
}

impl Drop for VulkanImage {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }

        unsafe {
            // Destroy image view
            self.ctx.device.destroy_image_view(self.view, None);

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free(allocation);
            }

            // Destroy image
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
