/// Presentation bridge - moves a finished frame to where the host displays it
///
/// - **Direct**: the host shares our device. The color target is copied into
///   the host backbuffer on the GPU, recorded into the host's own command
///   list. Nothing is submitted here.
/// - **Manual**: we own the device. The frame is read back through a staging
///   buffer, uploaded into a texture of the host's rendering context and
///   blitted into whatever framebuffer the host has bound. Synchronous: one
///   submit and one device-idle wait per frame.

use crate::error::{Error, Result};
use crate::delegate::PresentationMode;
use crate::device::{CommandList, GraphicsDevice, Image, ImageLayout, Rect2D};
use crate::render_pass::{
    ForeignContext, FramebufferId, SharedForeignContext, TextureId, ViewportResources,
};
use crate::{engine_debug, engine_warn};

// ============================================================================
// Manual mode host-side target
// ============================================================================

/// Texture + read framebuffer in the host context, sized like the
/// viewport resources they mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ForeignTarget {
    texture: TextureId,
    framebuffer: FramebufferId,
    width: u32,
    height: u32,
    generation: u64,
}

pub struct ManualBridge {
    context: SharedForeignContext,
    /// Created on first use, rebuilt when the viewport resources are
    target: Option<ForeignTarget>,
}

impl ManualBridge {
    fn new(context: SharedForeignContext) -> Self {
        Self { context, target: None }
    }

    fn release_target(context: &mut dyn ForeignContext, target: ForeignTarget) {
        context.delete_framebuffer(target.framebuffer);
        context.delete_texture(target.texture);
    }

    /// Host target matching `resources`, creating or rebuilding it as needed
    fn ensure_target(
        &mut self,
        context: &mut dyn ForeignContext,
        resources: &ViewportResources,
    ) -> Result<ForeignTarget> {
        if let Some(target) = self.target {
            if target.generation == resources.generation {
                return Ok(target);
            }
            engine_debug!("hdbridge::PresentationBridge",
                "Viewport resources changed, rebuilding host texture {}x{} -> {}x{}",
                target.width, target.height, resources.width, resources.height);
            self.target = None;
            Self::release_target(context, target);
        }

        let texture = context.create_texture(resources.width, resources.height, resources.color_format())?;
        let framebuffer = match context.create_framebuffer(texture) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                context.delete_texture(texture);
                return Err(e);
            }
        };

        let target = ForeignTarget {
            texture,
            framebuffer,
            width: resources.width,
            height: resources.height,
            generation: resources.generation,
        };
        self.target = Some(target);
        Ok(target)
    }

    fn present(
        &mut self,
        device: &dyn GraphicsDevice,
        command_list: &mut dyn CommandList,
        resources: &ViewportResources,
    ) -> Result<()> {
        let staging = resources.staging.as_ref().ok_or_else(|| {
            Error::InvalidResource("Manual presentation without a staging buffer".to_string())
        })?;
        let region = resources.rect();

        // GPU side: stage the color target, then drain the device
        command_list.copy_image_to_buffer(resources.color.as_ref(), staging.as_ref(), region)?;
        command_list.end()?;
        device.submit(&[&*command_list])?;
        device.wait_idle()?;

        // CPU side: upload into the host context and blit
        let pixels = staging.map()?;
        let context_cell = self.context.clone();
        let mut context = context_cell.try_borrow_mut().map_err(|_| {
            Error::BackendError("Host rendering context is already borrowed".to_string())
        })?;

        let target = self.ensure_target(&mut *context, resources)?;
        context.upload_texture(
            target.texture,
            target.width,
            target.height,
            resources.color_format(),
            pixels,
        )?;

        blit_preserving_bindings(&mut *context, target.framebuffer, region, region)
    }
}

impl Drop for ManualBridge {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            match self.context.try_borrow_mut() {
                Ok(mut context) => Self::release_target(&mut *context, target),
                Err(_) => engine_warn!("hdbridge::PresentationBridge",
                    "Host context busy, leaking texture {} and framebuffer {}",
                    target.texture, target.framebuffer),
            }
        }
    }
}

/// Blit `src` of `read_framebuffer` into the bound draw framebuffer, then
/// restore the read and draw bindings found on entry, also on failure
pub fn blit_preserving_bindings(
    context: &mut dyn ForeignContext,
    read_framebuffer: FramebufferId,
    src: Rect2D,
    dst: Rect2D,
) -> Result<()> {
    let saved_read = context.read_framebuffer_binding();
    let saved_draw = context.draw_framebuffer_binding();

    context.bind_read_framebuffer(read_framebuffer);
    let result = context.blit_framebuffer(src, dst);

    context.bind_read_framebuffer(saved_read);
    context.bind_draw_framebuffer(saved_draw);
    result
}

// ============================================================================
// Bridge
// ============================================================================

pub enum PresentationBridge {
    Direct,
    Manual(ManualBridge),
}

impl PresentationBridge {
    pub fn direct() -> Self {
        PresentationBridge::Direct
    }

    pub fn manual(context: SharedForeignContext) -> Self {
        PresentationBridge::Manual(ManualBridge::new(context))
    }

    pub fn mode(&self) -> PresentationMode {
        match self {
            PresentationBridge::Direct => PresentationMode::Direct,
            PresentationBridge::Manual(_) => PresentationMode::Manual,
        }
    }

    /// Viewport of the host context (Manual only)
    pub fn host_viewport(&self) -> Option<Rect2D> {
        match self {
            PresentationBridge::Direct => None,
            PresentationBridge::Manual(bridge) => {
                bridge.context.try_borrow().ok().map(|context| context.viewport())
            }
        }
    }

    /// Direct mode: copy the color target into `back_buffer`
    ///
    /// The copy region is `scissor` clamped to both images. Returns the region
    /// copied, `None` when it was empty and no copy was recorded.
    pub fn present_direct(
        &mut self,
        command_list: &mut dyn CommandList,
        resources: &ViewportResources,
        back_buffer: &dyn Image,
        scissor: Rect2D,
    ) -> Result<Option<Rect2D>> {
        if !matches!(self, PresentationBridge::Direct) {
            return Err(Error::InvalidResource("Direct presentation on a Manual bridge".to_string()));
        }

        let back_info = back_buffer.info();
        let region = scissor
            .intersect(&resources.rect())
            .intersect(&Rect2D::from_extent(back_info.width, back_info.height));

        command_list.transition_image(back_buffer, ImageLayout::Undefined, ImageLayout::TransferDst)?;
        let copied = if region.is_empty() {
            engine_warn!("hdbridge::PresentationBridge",
                "Empty copy region (scissor {:?}, color {}x{}, backbuffer {}x{}), skipping copy",
                scissor, resources.width, resources.height, back_info.width, back_info.height);
            None
        } else {
            command_list.copy_image(resources.color.as_ref(), back_buffer, region)?;
            Some(region)
        };
        command_list.transition_image(back_buffer, ImageLayout::TransferDst, ImageLayout::PresentSrc)?;

        Ok(copied)
    }

    /// Manual mode: stage, submit, wait, upload and blit
    ///
    /// `command_list` is ended and submitted here.
    pub fn present_manual(
        &mut self,
        device: &dyn GraphicsDevice,
        command_list: &mut dyn CommandList,
        resources: &ViewportResources,
    ) -> Result<()> {
        match self {
            PresentationBridge::Manual(bridge) => bridge.present(device, command_list, resources),
            PresentationBridge::Direct => {
                Err(Error::InvalidResource("Manual presentation on a Direct bridge".to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "presentation_tests.rs"]
mod tests;
