/// Viewport-sized GPU resources of one render pass
///
/// One color target, an optional depth target and, in Manual mode, a staging
/// buffer for CPU readback. At most one set exists at a time; it is rebuilt
/// exactly when the requested extent changes.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::delegate::PresentationMode;
use crate::device::{
    GraphicsDevice, Image, Buffer, ImageDesc, BufferDesc, ImageFormat, ImageUsage,
    ImageLayout, BufferUsage, MemoryLocation, Rect2D,
};
use crate::{engine_debug, engine_info};

pub struct ViewportResources {
    pub width: u32,
    pub height: u32,
    pub color: Arc<dyn Image>,
    pub depth: Option<Arc<dyn Image>>,
    /// Manual mode only
    pub staging: Option<Arc<dyn Buffer>>,
    /// Layout the color target was left in by the previous frame
    pub color_layout: ImageLayout,
    /// Bumped on every recreation; interop resources derived from this set
    /// compare it to know when to rebuild
    pub generation: u64,
}

impl ViewportResources {
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rect(&self) -> Rect2D {
        Rect2D::from_extent(self.width, self.height)
    }

    pub fn color_format(&self) -> ImageFormat {
        self.color.info().format
    }
}

#[derive(Default)]
pub struct ViewportResourceSet {
    current: Option<ViewportResources>,
    generation: u64,
}

impl ViewportResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ViewportResources> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ViewportResources> {
        self.current.as_mut()
    }

    /// Number of sets allocated so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Return the set for `width` x `height`, recreating it first when the
    /// extent differs from the one held
    ///
    /// Before an existing set is released the device is drained, so no
    /// in-flight work can still reference it.
    pub fn ensure(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        mode: PresentationMode,
        color_format: ImageFormat,
        depth_format: Option<ImageFormat>,
    ) -> Result<&mut ViewportResources> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource(format!(
                "Refusing to allocate viewport resources of {}x{}",
                width, height
            )));
        }

        let matches = self
            .current
            .as_ref()
            .is_some_and(|r| r.extent() == (width, height));

        if !matches {
            if let Some(old) = self.current.take() {
                engine_debug!("hdbridge::ViewportResources",
                    "Viewport changed {}x{} -> {}x{}, waiting for the device before release",
                    old.width, old.height, width, height);
                device.wait_idle()?;
                drop(old);
            }
            let resources = self.allocate(device, width, height, mode, color_format, depth_format)?;
            self.current = Some(resources);
        }

        self.current
            .as_mut()
            .ok_or_else(|| Error::InvalidResource("Viewport resources missing".to_string()))
    }

    fn allocate(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        mode: PresentationMode,
        color_format: ImageFormat,
        depth_format: Option<ImageFormat>,
    ) -> Result<ViewportResources> {
        let color = device.create_image(ImageDesc {
            label: "hdbridge color target".to_string(),
            width,
            height,
            format: color_format,
            usage: ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_SRC,
        })?;

        let depth = match depth_format {
            Some(format) => Some(device.create_image(ImageDesc {
                label: "hdbridge depth target".to_string(),
                width,
                height,
                format,
                usage: ImageUsage::DEPTH_ATTACHMENT,
            })?),
            None => None,
        };

        let staging = match mode {
            PresentationMode::Manual => Some(device.create_buffer(BufferDesc {
                label: "hdbridge readback staging".to_string(),
                size: width as u64 * height as u64 * color_format.bytes_per_pixel() as u64,
                usage: BufferUsage::TRANSFER_DST,
                location: MemoryLocation::GpuToCpu,
            })?),
            PresentationMode::Direct => None,
        };

        self.generation += 1;
        engine_info!("hdbridge::ViewportResources",
            "Allocated viewport resources {}x{} ({:?}, depth={:?}, staging={}) generation {}",
            width, height, color_format, depth_format, staging.is_some(), self.generation);

        Ok(ViewportResources {
            width,
            height,
            color,
            depth,
            staging,
            color_layout: ImageLayout::Undefined,
            generation: self.generation,
        })
    }

    /// Release the held set
    ///
    /// The caller must have drained the device.
    pub fn release(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
#[path = "viewport_resources_tests.rs"]
mod tests;
