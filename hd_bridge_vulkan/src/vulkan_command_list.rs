/// VulkanCommandList - Vulkan implementation of the CommandList trait

use hd_bridge::hdbridge::{Result, Error};
use hd_bridge::hdbridge::device::{
    CommandList, Image, Buffer, Pipeline, ImageLayout,
    RenderingInfo, AttachmentInfo, Viewport, Rect2D,
};
use hd_bridge::engine_err;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_image::VulkanImage;
use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_format::{
    aspect_mask, image_layout_to_vk, layout_access_and_stage,
    load_op_to_vk, store_op_to_vk, clear_value_to_vk, rect_to_vk, viewport_to_vk,
};

/// Vulkan command list implementation
///
/// Records rendering commands for later submission to the GPU. Owns its
/// command pool so lists can be recorded from different threads.
pub struct VulkanCommandList {
    /// Shared GPU context
    ctx: Arc<GpuContext>,
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    command_buffer: vk::CommandBuffer,
    /// Whether the command list is currently recording
    is_recording: bool,
    /// Whether we're inside a dynamic rendering scope
    in_rendering: bool,
}

impl VulkanCommandList {
    /// Create a new command list on the graphics queue family
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&command_pool_create_info, None)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to create command pool: {:?}", e))?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = match ctx.device.allocate_command_buffers(&command_buffer_allocate_info) {
                Ok(buffers) => buffers,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    return Err(engine_err!("hdbridge::vulkan", "Failed to allocate command buffer: {:?}", e));
                }
            };

            Ok(Self {
                ctx,
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                in_rendering: false,
            })
        }
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// # Safety
    ///
    /// `command_list` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(command_list: &dyn CommandList) -> &VulkanCommandList {
        &*(command_list as *const dyn CommandList as *const VulkanCommandList)
    }

    /// True while between `begin` and `end`
    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    fn ensure_recording(&self, operation: &str) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError(format!(
                "{}: command list not recording",
                operation
            )));
        }
        Ok(())
    }

    fn rendering_attachment(attachment: &AttachmentInfo, layout: vk::ImageLayout) -> vk::RenderingAttachmentInfo<'static> {
        let image = unsafe { VulkanImage::from_dyn(attachment.image.as_ref()) };
        vk::RenderingAttachmentInfo::default()
            .image_view(image.view)
            .image_layout(layout)
            .load_op(load_op_to_vk(attachment.load_op))
            .store_op(store_op_to_vk(attachment.store_op))
            .clear_value(clear_value_to_vk(attachment.clear_value))
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to reset command buffer: {:?}", e))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.ctx.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to begin command buffer: {:?}", e))?;
        }

        self.is_recording = true;
        self.in_rendering = false;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.ensure_recording("end")?;

        if self.in_rendering {
            return Err(Error::BackendError("end: rendering scope still open".to_string()));
        }

        unsafe {
            self.ctx.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to end command buffer: {:?}", e))?;
        }

        self.is_recording = false;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to reset command buffer: {:?}", e))?;
        }

        self.is_recording = false;
        self.in_rendering = false;
        Ok(())
    }

    fn transition_image(
        &mut self,
        image: &dyn Image,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    ) -> Result<()> {
        self.ensure_recording("transition_image")?;

        let vk_image = unsafe { VulkanImage::from_dyn(image) };
        let (src_access, src_stage) = layout_access_and_stage(old_layout);
        let (dst_access, dst_stage) = layout_access_and_stage(new_layout);

        let barrier = vk::ImageMemoryBarrier::default()
            .old_layout(image_layout_to_vk(old_layout))
            .new_layout(image_layout_to_vk(new_layout))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(vk_image.image)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_mask(image.info().format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            })
            .src_access_mask(src_access)
            .dst_access_mask(dst_access);

        unsafe {
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }

        Ok(())
    }

    fn begin_rendering(&mut self, info: &RenderingInfo) -> Result<()> {
        self.ensure_recording("begin_rendering")?;

        if self.in_rendering {
            return Err(Error::BackendError("begin_rendering: already rendering".to_string()));
        }

        let color_attachments = [Self::rendering_attachment(
            &info.color,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        )];
        let depth_attachment = info.depth.as_ref().map(|depth| {
            Self::rendering_attachment(depth, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
        });
        let has_stencil = info
            .depth
            .as_ref()
            .map(|depth| depth.image.info().format.has_stencil())
            .unwrap_or(false);

        let mut rendering_info = vk::RenderingInfo::default()
            .render_area(rect_to_vk(info.render_area))
            .layer_count(1)
            .color_attachments(&color_attachments);

        if let Some(depth) = depth_attachment.as_ref() {
            rendering_info = rendering_info.depth_attachment(depth);
            if has_stencil {
                rendering_info = rendering_info.stencil_attachment(depth);
            }
        }

        unsafe {
            self.ctx.device.cmd_begin_rendering(self.command_buffer, &rendering_info);
        }

        self.in_rendering = true;
        Ok(())
    }

    fn end_rendering(&mut self) -> Result<()> {
        self.ensure_recording("end_rendering")?;

        if !self.in_rendering {
            return Err(Error::BackendError("end_rendering: not rendering".to_string()));
        }

        unsafe {
            self.ctx.device.cmd_end_rendering(self.command_buffer);
        }

        self.in_rendering = false;
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.ensure_recording("bind_pipeline")?;

        unsafe {
            let vk_pipeline = VulkanPipeline::from_dyn(pipeline.as_ref());
            self.ctx.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline,
            );
        }

        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_recording("set_viewport")?;

        unsafe {
            self.ctx.device.cmd_set_viewport(self.command_buffer, 0, &[viewport_to_vk(viewport)]);
        }

        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.ensure_recording("set_scissor")?;

        unsafe {
            self.ctx.device.cmd_set_scissor(self.command_buffer, 0, &[rect_to_vk(scissor)]);
        }

        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.ensure_recording("draw")?;

        if !self.in_rendering {
            return Err(Error::BackendError("draw: outside of a rendering scope".to_string()));
        }

        unsafe {
            self.ctx.device.cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }

        Ok(())
    }

    fn copy_image(&mut self, src: &dyn Image, dst: &dyn Image, region: Rect2D) -> Result<()> {
        self.ensure_recording("copy_image")?;

        let src_image = unsafe { VulkanImage::from_dyn(src) };
        let dst_image = unsafe { VulkanImage::from_dyn(dst) };

        let subresource = |image: &dyn Image| vk::ImageSubresourceLayers {
            aspect_mask: aspect_mask(image.info().format),
            mip_level: 0,
            base_array_layer: 0,
            layer_count: 1,
        };
        let offset = vk::Offset3D { x: region.x, y: region.y, z: 0 };
        let copy = vk::ImageCopy {
            src_subresource: subresource(src),
            src_offset: offset,
            dst_subresource: subresource(dst),
            dst_offset: offset,
            extent: vk::Extent3D { width: region.width, height: region.height, depth: 1 },
        };

        unsafe {
            self.ctx.device.cmd_copy_image(
                self.command_buffer,
                src_image.image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst_image.image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[copy],
            );
        }

        Ok(())
    }

    fn copy_image_to_buffer(&mut self, src: &dyn Image, dst: &dyn Buffer, region: Rect2D) -> Result<()> {
        self.ensure_recording("copy_image_to_buffer")?;

        let needed = region.width as u64 * region.height as u64 * src.info().format.bytes_per_pixel() as u64;
        if needed > dst.size() {
            return Err(Error::InvalidResource(format!(
                "copy_image_to_buffer: {} bytes needed, buffer holds {}",
                needed,
                dst.size()
            )));
        }

        let src_image = unsafe { VulkanImage::from_dyn(src) };
        let dst_buffer = unsafe { VulkanBuffer::from_dyn(dst) };

        // Tightly packed rows
        let copy = vk::BufferImageCopy {
            buffer_offset: 0,
            buffer_row_length: 0,
            buffer_image_height: 0,
            image_subresource: vk::ImageSubresourceLayers {
                aspect_mask: aspect_mask(src.info().format),
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            },
            image_offset: vk::Offset3D { x: region.x, y: region.y, z: 0 },
            image_extent: vk::Extent3D { width: region.width, height: region.height, depth: 1 },
        };

        unsafe {
            self.ctx.device.cmd_copy_image_to_buffer(
                self.command_buffer,
                src_image.image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                dst_buffer.buffer,
                &[copy],
            );

            // Make the transfer visible to host reads after the fence
            let barrier = vk::BufferMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::HOST_READ)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .buffer(dst_buffer.buffer)
                .offset(0)
                .size(vk::WHOLE_SIZE);

            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::HOST,
                vk::DependencyFlags::empty(),
                &[],
                &[barrier],
                &[],
            );
        }

        Ok(())
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            // Freeing the pool frees its command buffer
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
