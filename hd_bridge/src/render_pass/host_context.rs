/// Host rendering context used to display frames in Manual mode
///
/// This is the foreign graphics API (e.g. the host viewport's OpenGL
/// context). It is bound to the host's thread, hence not `Send`.

use std::cell::RefCell;
use std::rc::Rc;
use crate::error::Result;
use crate::device::{ImageFormat, Rect2D};

/// Texture name in the foreign context
pub type TextureId = u32;
/// Framebuffer name in the foreign context
pub type FramebufferId = u32;

pub trait ForeignContext {
    /// Viewport currently set on the context
    fn viewport(&self) -> Rect2D;

    fn create_texture(&mut self, width: u32, height: u32, format: ImageFormat) -> Result<TextureId>;

    /// Replace the whole texture contents with tightly packed pixels
    fn upload_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: ImageFormat,
        pixels: &[u8],
    ) -> Result<()>;

    fn delete_texture(&mut self, texture: TextureId);

    /// Framebuffer with `texture` as its only color attachment
    fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId>;

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);

    fn read_framebuffer_binding(&self) -> FramebufferId;

    fn draw_framebuffer_binding(&self) -> FramebufferId;

    fn bind_read_framebuffer(&mut self, framebuffer: FramebufferId);

    fn bind_draw_framebuffer(&mut self, framebuffer: FramebufferId);

    /// Copy `src` of the read framebuffer into `dst` of the draw framebuffer
    fn blit_framebuffer(&mut self, src: Rect2D, dst: Rect2D) -> Result<()>;
}

pub type SharedForeignContext = Rc<RefCell<dyn ForeignContext>>;
