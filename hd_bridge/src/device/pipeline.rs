/// Pipeline trait and pipeline descriptor

use std::sync::Arc;
use crate::device::{Shader, ImageFormat};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Descriptor for creating a graphics pipeline
///
/// Pipelines render with dynamic rendering: there is no render pass object,
/// only the attachment formats. Viewport and scissor are dynamic state.
#[derive(Clone)]
pub struct PipelineDesc {
    /// Vertex shader
    pub vertex_shader: Arc<dyn Shader>,
    /// Fragment shader
    pub fragment_shader: Arc<dyn Shader>,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Face culling
    pub cull_mode: CullMode,
    /// Format of the single color attachment
    pub color_format: ImageFormat,
    /// Format of the depth attachment, if any
    pub depth_format: Option<ImageFormat>,
}

/// Graphics pipeline resource trait
///
/// Implemented by backend-specific pipeline types (e.g., VulkanPipeline).
/// The pipeline is automatically destroyed when dropped.
pub trait Pipeline: Send + Sync {}
