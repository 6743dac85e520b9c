/// VulkanBuffer - Vulkan implementation of the Buffer trait

use hd_bridge::hdbridge::{Result, Error};
use hd_bridge::hdbridge::device::Buffer;
use hd_bridge::engine_err;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

/// Vulkan buffer implementation
///
/// Host-visible buffers stay persistently mapped for their whole lifetime.
pub struct VulkanBuffer {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Requested size (the allocation may be larger)
    pub(crate) size: u64,
}

impl VulkanBuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
        }
    }

    /// # Safety
    ///
    /// `buffer` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(buffer: &dyn Buffer) -> &VulkanBuffer {
        &*(buffer as *const dyn Buffer as *const VulkanBuffer)
    }

    /// Make GPU writes visible to the host for non-coherent memory
    fn invalidate(&self, allocation: &Allocation) -> Result<()> {
        if allocation
            .memory_properties()
            .contains(vk::MemoryPropertyFlags::HOST_COHERENT)
        {
            return Ok(());
        }

        let atom = self.ctx.non_coherent_atom_size;
        let offset = allocation.offset() - allocation.offset() % atom;
        let range = vk::MappedMemoryRange::default()
            .memory(unsafe { allocation.memory() })
            .offset(offset)
            .size(vk::WHOLE_SIZE);

        unsafe {
            self.ctx
                .device
                .invalidate_mapped_memory_ranges(&[range])
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to invalidate mapped memory: {:?}", e))
        }
    }
}

impl Buffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn map(&self) -> Result<&[u8]> {
        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Buffer has no allocation".to_string()))?;

        self.invalidate(allocation)?;

        let mapped = allocation
            .mapped_slice()
            .ok_or_else(|| Error::InvalidResource("Buffer is not CPU-accessible".to_string()))?;

        Ok(&mapped[..self.size as usize])
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free(allocation);
            }

            // Destroy buffer
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
