/// VulkanPipeline - Vulkan implementation of the Pipeline trait

use hd_bridge::hdbridge::Result;
use hd_bridge::hdbridge::device::{Pipeline, PipelineDesc};
use hd_bridge::engine_err;
use ash::vk;

use crate::vulkan_format::{image_format_to_vk, topology_to_vk, cull_mode_to_vk, shader_stage_to_vk};
use crate::vulkan_shader::VulkanShader;

/// Vulkan pipeline implementation
pub struct VulkanPipeline {
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (empty: the pass has no descriptors or push constants)
    pub(crate) pipeline_layout: vk::PipelineLayout,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanPipeline {
    /// Build a graphics pipeline for dynamic rendering
    ///
    /// No vertex input: geometry is generated in the vertex shader from the
    /// vertex index. Viewport and scissor are dynamic state.
    pub(crate) fn new(device: &ash::Device, desc: &PipelineDesc) -> Result<Self> {
        unsafe {
            // Downcast shaders to Vulkan types
            let vertex_shader = VulkanShader::from_dyn(desc.vertex_shader.as_ref());
            let fragment_shader = VulkanShader::from_dyn(desc.fragment_shader.as_ref());

            let shader_stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shader_stage_to_vk(vertex_shader.stage))
                    .module(vertex_shader.module)
                    .name(&vertex_shader.entry_point),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(shader_stage_to_vk(fragment_shader.stage))
                    .module(fragment_shader.module)
                    .name(&fragment_shader.entry_point),
            ];

            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();

            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(topology_to_vk(desc.topology))
                .primitive_restart_enable(false);

            // Viewport state (dynamic, only the counts matter)
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(vk::PolygonMode::FILL)
                .line_width(1.0)
                .cull_mode(cull_mode_to_vk(desc.cull_mode))
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .depth_bias_enable(false);

            let has_depth = desc.depth_format.is_some();
            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(has_depth)
                .depth_write_enable(has_depth)
                .depth_compare_op(vk::CompareOp::LESS_OR_EQUAL)
                .depth_bounds_test_enable(false)
                .stencil_test_enable(false);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(false);

            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(std::slice::from_ref(&color_blend_attachment));

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
                .dynamic_states(&dynamic_states);

            // Attachment formats replace the render pass object
            let color_formats = [image_format_to_vk(desc.color_format)];
            let depth_format = desc
                .depth_format
                .map(image_format_to_vk)
                .unwrap_or(vk::Format::UNDEFINED);
            let stencil_format = match desc.depth_format {
                Some(format) if format.has_stencil() => depth_format,
                _ => vk::Format::UNDEFINED,
            };
            let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
                .color_attachment_formats(&color_formats)
                .depth_attachment_format(depth_format)
                .stencil_attachment_format(stencil_format);

            let layout_create_info = vk::PipelineLayoutCreateInfo::default();
            let pipeline_layout = device
                .create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to create pipeline layout: {:?}", e))?;

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&shader_stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .depth_stencil_state(&depth_stencil_state)
                .multisample_state(&multisample_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(pipeline_layout)
                .push_next(&mut rendering_info);

            let pipelines = device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_create_info], None)
                .map_err(|(_, e)| {
                    device.destroy_pipeline_layout(pipeline_layout, None);
                    engine_err!("hdbridge::vulkan", "Failed to create graphics pipeline: {:?}", e)
                })?;

            Ok(Self {
                pipeline: pipelines[0],
                pipeline_layout,
                device: device.clone(),
            })
        }
    }

    /// # Safety
    ///
    /// `pipeline` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(pipeline: &dyn Pipeline) -> &VulkanPipeline {
        &*(pipeline as *const dyn Pipeline as *const VulkanPipeline)
    }
}

impl Pipeline for VulkanPipeline {}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            // Destroy pipeline
            self.device.destroy_pipeline(self.pipeline, None);
            // Destroy pipeline layout
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
