/// CommandList trait - for recording rendering and transfer commands

use std::sync::Arc;
use crate::error::Result;
use crate::device::{Image, Buffer, Pipeline, ImageLayout};

/// Command list for recording commands
///
/// Commands are recorded and later submitted to the GPU via
/// `GraphicsDevice::submit()`, either by this engine or by the host.
pub trait CommandList: Send + Sync {
    /// Reset and begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Drop whatever was recorded and leave the list ready to `begin` again
    ///
    /// The list must not be pending execution.
    fn reset(&mut self) -> Result<()>;

    /// Record a layout transition (pipeline barrier) for a whole image
    fn transition_image(
        &mut self,
        image: &dyn Image,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    ) -> Result<()>;

    /// Begin a dynamic rendering scope
    fn begin_rendering(&mut self, info: &RenderingInfo) -> Result<()>;

    /// End the current rendering scope
    fn end_rendering(&mut self) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Draw vertices
    ///
    /// # Arguments
    ///
    /// * `vertex_count` - Number of vertices to draw
    /// * `first_vertex` - Index of first vertex
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Copy `region` of `src` (TransferSrc layout) into the same region of
    /// `dst` (TransferDst layout)
    fn copy_image(&mut self, src: &dyn Image, dst: &dyn Image, region: Rect2D) -> Result<()>;

    /// Copy `region` of `src` (TransferSrc layout) tightly packed into `dst`
    fn copy_image_to_buffer(&mut self, src: &dyn Image, dst: &dyn Buffer, region: Rect2D) -> Result<()>;
}

// ===== ATTACHMENTS =====

/// What happens to attachment contents when rendering begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

/// What happens to attachment contents when rendering ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

/// One attachment of a rendering scope
#[derive(Clone)]
pub struct AttachmentInfo {
    pub image: Arc<dyn Image>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_value: ClearValue,
}

/// Parameters of `CommandList::begin_rendering`
#[derive(Clone)]
pub struct RenderingInfo {
    /// Area rendered to
    pub render_area: Rect2D,
    /// Color attachment (ColorAttachment layout)
    pub color: AttachmentInfo,
    /// Optional depth attachment (DepthAttachment layout)
    pub depth: Option<AttachmentInfo>,
}

// ===== DYNAMIC STATE =====

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-depth viewport covering `rect`
    pub fn from_rect(rect: Rect2D) -> Self {
        Self {
            x: rect.x as f32,
            y: rect.y as f32,
            width: rect.width as f32,
            height: rect.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Integer rectangle covered by this viewport
    pub fn to_rect(&self) -> Rect2D {
        Rect2D {
            x: self.x as i32,
            y: self.y as i32,
            width: self.width.max(0.0) as u32,
            height: self.height.max(0.0) as u32,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Rectangle anchored at the origin
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// True when the rectangle covers no pixel
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlap of two rectangles (empty rectangle when they do not overlap)
    pub fn intersect(&self, other: &Rect2D) -> Rect2D {
        let x0 = (self.x as i64).max(other.x as i64);
        let y0 = (self.y as i64).max(other.y as i64);
        let x1 = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let y1 = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);

        if x1 <= x0 || y1 <= y0 {
            return Rect2D { x: x0 as i32, y: y0 as i32, width: 0, height: 0 };
        }

        Rect2D {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }
}

#[cfg(test)]
#[path = "command_list_tests.rs"]
mod tests;
