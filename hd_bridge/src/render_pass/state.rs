/// Render pass state handed in by the host on every execution

use glam::IVec4;
use crate::device::Rect2D;

/// Validated camera framing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    /// Pixel rectangle that is rendered
    pub data_window: Rect2D,
    pub pixel_aspect_ratio: f32,
}

impl CameraFraming {
    pub fn new(data_window: Rect2D) -> Self {
        Self {
            data_window,
            pixel_aspect_ratio: 1.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.data_window.is_empty() && self.pixel_aspect_ratio > 0.0
    }
}

/// Either a camera framing or a legacy raw viewport (x, y, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderPassState {
    pub framing: Option<CameraFraming>,
    pub viewport: IVec4,
}

impl RenderPassState {
    pub fn from_viewport(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            framing: None,
            viewport: IVec4::new(x, y, width, height),
        }
    }

    pub fn from_framing(data_window: Rect2D) -> Self {
        Self {
            framing: Some(CameraFraming::new(data_window)),
            viewport: IVec4::ZERO,
        }
    }

    /// Rectangle requested by the host: the framing data window when it is
    /// valid, otherwise the legacy viewport
    pub fn requested_viewport(&self) -> Rect2D {
        if let Some(framing) = self.framing.filter(|f| f.is_valid()) {
            return framing.data_window;
        }
        Rect2D {
            x: self.viewport.x,
            y: self.viewport.y,
            width: self.viewport.z.max(0) as u32,
            height: self.viewport.w.max(0) as u32,
        }
    }
}

/// A viewport no image may be allocated for
///
/// Either axis zero, or at most one pixel on both axes (reported by hosts
/// whose camera framing is not valid yet).
pub fn is_degenerate(rect: &Rect2D) -> bool {
    rect.is_empty() || (rect.width <= 1 && rect.height <= 1)
}

/// Requested viewport, or `ambient` when the request is degenerate
///
/// Returns `None` when no usable viewport exists.
pub fn resolve_viewport(state: &RenderPassState, ambient: Option<Rect2D>) -> Option<Rect2D> {
    let requested = state.requested_viewport();
    if !is_degenerate(&requested) {
        return Some(requested);
    }
    ambient.filter(|r| !is_degenerate(r))
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
