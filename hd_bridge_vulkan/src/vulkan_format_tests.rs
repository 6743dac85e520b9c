//! Unit tests for Vulkan conversion functions
//!
//! Pure mappings only, no GPU required.

use super::*;

const ALL_FORMATS: [ImageFormat; 9] = [
    ImageFormat::R8G8B8A8_SRGB,
    ImageFormat::R8G8B8A8_UNORM,
    ImageFormat::B8G8R8A8_SRGB,
    ImageFormat::B8G8R8A8_UNORM,
    ImageFormat::R16G16B16A16_SFLOAT,
    ImageFormat::R32G32B32A32_SFLOAT,
    ImageFormat::D16_UNORM,
    ImageFormat::D32_FLOAT,
    ImageFormat::D24_UNORM_S8_UINT,
];

// ============================================================================
// IMAGE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_image_format_to_vk_color_formats() {
    assert_eq!(image_format_to_vk(ImageFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(image_format_to_vk(ImageFormat::B8G8R8A8_SRGB), vk::Format::B8G8R8A8_SRGB);
    assert_eq!(
        image_format_to_vk(ImageFormat::R16G16B16A16_SFLOAT),
        vk::Format::R16G16B16A16_SFLOAT
    );
}

#[test]
fn test_image_format_to_vk_depth_formats() {
    assert_eq!(image_format_to_vk(ImageFormat::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(image_format_to_vk(ImageFormat::D16_UNORM), vk::Format::D16_UNORM);
    assert_eq!(
        image_format_to_vk(ImageFormat::D24_UNORM_S8_UINT),
        vk::Format::D24_UNORM_S8_UINT
    );
}

#[test]
fn test_image_format_reverse_mapping() {
    for format in ALL_FORMATS {
        assert_eq!(vk_to_image_format(image_format_to_vk(format)), Some(format));
    }
}

#[test]
fn test_unknown_vk_format_is_rejected() {
    assert_eq!(vk_to_image_format(vk::Format::BC1_RGB_UNORM_BLOCK), None);
    assert_eq!(vk_to_image_format(vk::Format::UNDEFINED), None);
}

#[test]
fn test_aspect_mask() {
    assert_eq!(aspect_mask(ImageFormat::R8G8B8A8_UNORM), vk::ImageAspectFlags::COLOR);
    assert_eq!(aspect_mask(ImageFormat::D32_FLOAT), vk::ImageAspectFlags::DEPTH);
    assert_eq!(
        aspect_mask(ImageFormat::D24_UNORM_S8_UINT),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
}

// ============================================================================
// USAGE / MEMORY TESTS
// ============================================================================

#[test]
fn test_render_target_usage() {
    let flags = image_usage_to_vk(ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_SRC);
    assert_eq!(
        flags,
        vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC
    );
    assert_eq!(image_usage_to_vk(ImageUsage::empty()), vk::ImageUsageFlags::empty());
}

#[test]
fn test_depth_usage() {
    assert_eq!(
        image_usage_to_vk(ImageUsage::DEPTH_ATTACHMENT),
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
    );
}

#[test]
fn test_staging_buffer_usage() {
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::TRANSFER_DST),
        vk::BufferUsageFlags::TRANSFER_DST
    );
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::VERTEX | BufferUsage::UNIFORM),
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::UNIFORM_BUFFER
    );
}

#[test]
fn test_memory_location_mapping() {
    assert_eq!(
        memory_location_to_allocator(MemoryLocation::GpuToCpu),
        gpu_allocator::MemoryLocation::GpuToCpu
    );
    assert_eq!(
        memory_location_to_allocator(MemoryLocation::GpuOnly),
        gpu_allocator::MemoryLocation::GpuOnly
    );
    assert_eq!(
        memory_location_to_allocator(MemoryLocation::CpuToGpu),
        gpu_allocator::MemoryLocation::CpuToGpu
    );
}

// ============================================================================
// LAYOUT / BARRIER TESTS
// ============================================================================

#[test]
fn test_layout_mapping() {
    assert_eq!(image_layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
    assert_eq!(
        image_layout_to_vk(ImageLayout::ColorAttachment),
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
    );
    assert_eq!(
        image_layout_to_vk(ImageLayout::DepthAttachment),
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
    assert_eq!(image_layout_to_vk(ImageLayout::TransferSrc), vk::ImageLayout::TRANSFER_SRC_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::TransferDst), vk::ImageLayout::TRANSFER_DST_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::PresentSrc), vk::ImageLayout::PRESENT_SRC_KHR);
}

#[test]
fn test_undefined_layout_waits_on_nothing() {
    let (access, stage) = layout_access_and_stage(ImageLayout::Undefined);
    assert!(access.is_empty());
    assert_eq!(stage, vk::PipelineStageFlags::TOP_OF_PIPE);
}

#[test]
fn test_color_attachment_scope() {
    let (access, stage) = layout_access_and_stage(ImageLayout::ColorAttachment);
    assert!(access.contains(vk::AccessFlags::COLOR_ATTACHMENT_WRITE));
    assert_eq!(stage, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
}

#[test]
fn test_transfer_scopes() {
    let (src_access, src_stage) = layout_access_and_stage(ImageLayout::TransferSrc);
    let (dst_access, dst_stage) = layout_access_and_stage(ImageLayout::TransferDst);
    assert_eq!(src_access, vk::AccessFlags::TRANSFER_READ);
    assert_eq!(dst_access, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(src_stage, vk::PipelineStageFlags::TRANSFER);
    assert_eq!(dst_stage, vk::PipelineStageFlags::TRANSFER);
}

#[test]
fn test_depth_attachment_scope_covers_both_fragment_test_stages() {
    let (_, stage) = layout_access_and_stage(ImageLayout::DepthAttachment);
    assert!(stage.contains(vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS));
    assert!(stage.contains(vk::PipelineStageFlags::LATE_FRAGMENT_TESTS));
}

// ============================================================================
// PIPELINE / RENDERING STATE TESTS
// ============================================================================

#[test]
fn test_pipeline_state_mapping() {
    assert_eq!(shader_stage_to_vk(ShaderStage::Vertex), vk::ShaderStageFlags::VERTEX);
    assert_eq!(shader_stage_to_vk(ShaderStage::Fragment), vk::ShaderStageFlags::FRAGMENT);
    assert_eq!(topology_to_vk(PrimitiveTopology::TriangleList), vk::PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(cull_mode_to_vk(CullMode::None), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(CullMode::Back), vk::CullModeFlags::BACK);
}

#[test]
fn test_attachment_ops() {
    assert_eq!(load_op_to_vk(LoadOp::Clear), vk::AttachmentLoadOp::CLEAR);
    assert_eq!(load_op_to_vk(LoadOp::Load), vk::AttachmentLoadOp::LOAD);
    assert_eq!(store_op_to_vk(StoreOp::Store), vk::AttachmentStoreOp::STORE);
    assert_eq!(store_op_to_vk(StoreOp::DontCare), vk::AttachmentStoreOp::DONT_CARE);
}

#[test]
fn test_clear_values() {
    let color = clear_value_to_vk(ClearValue::Color([0.0, 1.0, 0.0, 1.0]));
    let depth = clear_value_to_vk(ClearValue::DepthStencil { depth: 1.0, stencil: 0 });
    unsafe {
        assert_eq!(color.color.float32, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(depth.depth_stencil.depth, 1.0);
        assert_eq!(depth.depth_stencil.stencil, 0);
    }
}

#[test]
fn test_rect_and_viewport() {
    let rect = rect_to_vk(Rect2D { x: 4, y: -2, width: 800, height: 600 });
    assert_eq!(rect.offset.x, 4);
    assert_eq!(rect.offset.y, -2);
    assert_eq!(rect.extent.width, 800);
    assert_eq!(rect.extent.height, 600);

    let viewport = viewport_to_vk(Viewport::from_rect(Rect2D::from_extent(1196, 756)));
    assert_eq!(viewport.width, 1196.0);
    assert_eq!(viewport.height, 756.0);
    assert_eq!(viewport.min_depth, 0.0);
    assert_eq!(viewport.max_depth, 1.0);
}

// ============================================================================
// DEBUG SEVERITY TESTS
// ============================================================================

#[test]
fn test_debug_severity_flags() {
    assert_eq!(
        debug_severity_flags(DebugSeverity::ErrorsOnly),
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
    );
    let both = debug_severity_flags(DebugSeverity::ErrorsAndWarnings);
    assert!(both.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
    assert!(!both.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
    let all = debug_severity_flags(DebugSeverity::All);
    assert!(all.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
}
