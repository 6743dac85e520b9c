/// GraphicsDevice trait - factory and queue interface of a GPU device

use std::sync::Arc;
use crate::error::Result;
use crate::device::{
    Image, Buffer, Shader, Pipeline, CommandList,
    ImageDesc, BufferDesc, ShaderDesc, PipelineDesc,
    ImageFormat, Viewport, Rect2D,
};

// ============================================================================
// Configuration
// ============================================================================

/// Severity filter for validation layer messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    /// Only errors
    ErrorsOnly,
    /// Errors and warnings
    ErrorsAndWarnings,
    /// Everything the layers report, including info and verbose
    All,
}

/// Configuration consumed by device factories
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Which validation messages are forwarded to the engine logger
    pub debug_severity: DebugSeverity,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "HdBridge Application".to_string(),
            app_version: (1, 0, 0),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
        }
    }
}

// ============================================================================
// Surface
// ============================================================================

/// Presentation surface a device may be attached to
///
/// Headless devices have none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Color format of the surface images
    pub format: ImageFormat,
    /// Current viewport of the surface
    pub viewport: Viewport,
    /// Current scissor rectangle of the surface
    pub scissor: Rect2D,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Main device trait
///
/// Central factory interface for GPU resources plus the queue operations the
/// render pass needs. Implemented by backend-specific devices
/// (e.g., VulkanGraphicsDevice). Resources release themselves when dropped.
pub trait GraphicsDevice: Send + Sync {
    /// Short backend identifier (e.g. "vulkan")
    fn backend_name(&self) -> &'static str;

    /// Create an image
    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn Image>>;

    /// Create a buffer
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a shader module from a precompiled binary blob
    fn create_shader(&mut self, desc: ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Create a graphics pipeline
    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Allocate a command list owned by the caller
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists to the graphics queue
    ///
    /// Does not wait for completion.
    fn submit(&self, command_lists: &[&dyn CommandList]) -> Result<()>;

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> Result<()>;

    /// Presentation surface, if the device has one
    fn surface(&self) -> Option<SurfaceInfo>;
}
