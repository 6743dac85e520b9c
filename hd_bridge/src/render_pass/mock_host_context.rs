/// Mock foreign context for unit tests
///
/// Records texture traffic, binding changes and blits. Both framebuffer
/// bindings start on `HOST_FRAMEBUFFER`, the framebuffer a host viewport
/// would have bound.

use crate::error::{Error, Result};
use crate::device::{ImageFormat, Rect2D};
use crate::render_pass::{ForeignContext, FramebufferId, TextureId};

pub const HOST_FRAMEBUFFER: FramebufferId = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum ForeignEvent {
    CreateTexture { texture: TextureId, width: u32, height: u32 },
    Upload { texture: TextureId, width: u32, height: u32, bytes: usize },
    DeleteTexture(TextureId),
    CreateFramebuffer { framebuffer: FramebufferId, texture: TextureId },
    DeleteFramebuffer(FramebufferId),
    BindRead(FramebufferId),
    BindDraw(FramebufferId),
    Blit { src: Rect2D, dst: Rect2D, read: FramebufferId, draw: FramebufferId },
}

pub struct MockForeignContext {
    pub viewport: Rect2D,
    pub events: Vec<ForeignEvent>,
    pub read_binding: FramebufferId,
    pub draw_binding: FramebufferId,
    pub fail_blit: bool,
    next_name: u32,
}

impl MockForeignContext {
    pub fn new(viewport: Rect2D) -> Self {
        Self {
            viewport,
            events: Vec::new(),
            read_binding: HOST_FRAMEBUFFER,
            draw_binding: HOST_FRAMEBUFFER,
            fail_blit: false,
            next_name: 100,
        }
    }

    pub fn blits(&self) -> Vec<ForeignEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ForeignEvent::Blit { .. }))
            .cloned()
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, ForeignEvent::Upload { .. })).count()
    }

    fn next_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

impl ForeignContext for MockForeignContext {
    fn viewport(&self) -> Rect2D {
        self.viewport
    }

    fn create_texture(&mut self, width: u32, height: u32, _format: ImageFormat) -> Result<TextureId> {
        let texture = self.next_name();
        self.events.push(ForeignEvent::CreateTexture { texture, width, height });
        Ok(texture)
    }

    fn upload_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: ImageFormat,
        pixels: &[u8],
    ) -> Result<()> {
        let expected = (width * height * format.bytes_per_pixel()) as usize;
        if pixels.len() < expected {
            return Err(Error::InvalidResource(format!(
                "Upload of {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }
        self.events.push(ForeignEvent::Upload { texture, width, height, bytes: pixels.len() });
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.events.push(ForeignEvent::DeleteTexture(texture));
    }

    fn create_framebuffer(&mut self, texture: TextureId) -> Result<FramebufferId> {
        let framebuffer = self.next_name();
        self.events.push(ForeignEvent::CreateFramebuffer { framebuffer, texture });
        Ok(framebuffer)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.events.push(ForeignEvent::DeleteFramebuffer(framebuffer));
    }

    fn read_framebuffer_binding(&self) -> FramebufferId {
        self.read_binding
    }

    fn draw_framebuffer_binding(&self) -> FramebufferId {
        self.draw_binding
    }

    fn bind_read_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.read_binding = framebuffer;
        self.events.push(ForeignEvent::BindRead(framebuffer));
    }

    fn bind_draw_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.draw_binding = framebuffer;
        self.events.push(ForeignEvent::BindDraw(framebuffer));
    }

    fn blit_framebuffer(&mut self, src: Rect2D, dst: Rect2D) -> Result<()> {
        if self.fail_blit {
            return Err(Error::BackendError("mock blit rejected".to_string()));
        }
        self.events.push(ForeignEvent::Blit {
            src,
            dst,
            read: self.read_binding,
            draw: self.draw_binding,
        });
        Ok(())
    }
}
