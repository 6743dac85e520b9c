/// Mock graphics device for unit tests (no GPU required)
///
/// Every resource, submission, idle wait, map and recorded command lands in a
/// shared `MockJournal`, so tests can assert on exactly what the engine asked
/// the device to do and in which order.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::delegate::DeviceFactory;
use crate::device::{
    GraphicsDevice, Image, Buffer, Shader, Pipeline, CommandList,
    ImageDesc, ImageInfo, BufferDesc, ShaderDesc, ShaderStage, PipelineDesc,
    ImageFormat, ImageLayout, SurfaceInfo, RenderingInfo, ClearValue,
    Viewport, Rect2D,
};

// ============================================================================
// Journal
// ============================================================================

/// Device-level events, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    ImageCreated(u64),
    ImageReleased(u64),
    BufferCreated(u64),
    BufferReleased(u64),
    ShaderCreated(u64),
    ShaderReleased(u64),
    PipelineCreated(u64),
    PipelineReleased(u64),
    CommandListCreated(u64),
    Submit { command_lists: Vec<u64> },
    WaitIdle,
    Map(u64),
}

/// Commands recorded into mock command lists
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Begin,
    End,
    Reset,
    Transition { image: u64, old: ImageLayout, new: ImageLayout },
    BeginRendering { color: u64, depth: Option<u64>, area: Rect2D, clear: ClearValue },
    EndRendering,
    BindPipeline { pipeline: u64 },
    SetViewport(Viewport),
    SetScissor(Rect2D),
    Draw { vertex_count: u32, first_vertex: u32 },
    CopyImage { src: u64, dst: u64, region: Rect2D },
    CopyImageToBuffer { src: u64, dst: u64, region: Rect2D },
}

#[derive(Debug, Default)]
pub struct MockJournal {
    next_id: u64,
    pub events: Vec<MockEvent>,
    /// (command list id, command)
    pub commands: Vec<(u64, MockCommand)>,
    pub image_descs: Vec<(u64, ImageDesc)>,
    pub buffer_descs: Vec<(u64, BufferDesc)>,
    /// (shader id, stage, blob length)
    pub shader_blobs: Vec<(u64, ShaderStage, usize)>,
    /// Make the next submissions fail
    pub fail_submit: bool,
    /// Make layout transitions fail
    pub fail_transition: bool,
}

impl MockJournal {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn count(&self, pred: impl Fn(&MockEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn idle_waits(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::WaitIdle))
    }

    pub fn submits(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Submit { .. }))
    }

    pub fn maps(&self) -> usize {
        self.count(|e| matches!(e, MockEvent::Map(_)))
    }

    pub fn images_created(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MockEvent::ImageCreated(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn images_released(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MockEvent::ImageReleased(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn buffers_created(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MockEvent::BufferCreated(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn buffers_released(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MockEvent::BufferReleased(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Recorded commands, without the command list id
    pub fn command_kinds(&self) -> Vec<MockCommand> {
        self.commands.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn image_desc(&self, id: u64) -> Option<&ImageDesc> {
        self.image_descs.iter().find(|(i, _)| *i == id).map(|(_, d)| d)
    }

    pub fn buffer_desc(&self, id: u64) -> Option<&BufferDesc> {
        self.buffer_descs.iter().find(|(i, _)| *i == id).map(|(_, d)| d)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.commands.clear();
    }
}

pub type SharedJournal = Arc<Mutex<MockJournal>>;

// ============================================================================
// Mock Image
// ============================================================================

#[derive(Debug)]
pub struct MockImage {
    pub id: u64,
    pub info: ImageInfo,
    journal: SharedJournal,
}

impl Image for MockImage {
    fn info(&self) -> &ImageInfo {
        &self.info
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.push(MockEvent::ImageReleased(self.id));
        }
    }
}

/// Id of an image created by the mock device
pub fn image_id(image: &dyn Image) -> u64 {
    // Every image handed to mock command lists comes from MockGraphicsDevice
    let mock = unsafe { &*(image as *const dyn Image as *const MockImage) };
    mock.id
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub id: u64,
    pub data: Vec<u8>,
    journal: SharedJournal,
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn map(&self) -> Result<&[u8]> {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.push(MockEvent::Map(self.id));
        }
        Ok(&self.data)
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.push(MockEvent::BufferReleased(self.id));
        }
    }
}

fn buffer_id(buffer: &dyn Buffer) -> u64 {
    let mock = unsafe { &*(buffer as *const dyn Buffer as *const MockBuffer) };
    mock.id
}

// ============================================================================
// Mock Shader / Pipeline
// ============================================================================

#[derive(Debug)]
pub struct MockShader {
    pub id: u64,
    pub stage: ShaderStage,
    journal: SharedJournal,
}

impl Shader for MockShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for MockShader {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.push(MockEvent::ShaderReleased(self.id));
        }
    }
}

#[derive(Debug)]
pub struct MockPipeline {
    pub id: u64,
    pub color_format: ImageFormat,
    pub depth_format: Option<ImageFormat>,
    journal: SharedJournal,
}

impl Pipeline for MockPipeline {}

impl Drop for MockPipeline {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.push(MockEvent::PipelineReleased(self.id));
        }
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

#[derive(Debug)]
pub struct MockCommandList {
    pub id: u64,
    pub is_recording: bool,
    journal: SharedJournal,
}

impl MockCommandList {
    fn record(&self, command: MockCommand) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError(format!(
                "Command list {} is not recording ({:?})",
                self.id, command
            )));
        }
        let mut journal = self.journal.lock().unwrap();
        journal.commands.push((self.id, command));
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError(format!("Command list {} already recording", self.id)));
        }
        self.is_recording = true;
        self.record(MockCommand::Begin)
    }

    fn end(&mut self) -> Result<()> {
        self.record(MockCommand::End)?;
        self.is_recording = false;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.is_recording = false;
        self.journal.lock().unwrap().commands.push((self.id, MockCommand::Reset));
        Ok(())
    }

    fn transition_image(
        &mut self,
        image: &dyn Image,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    ) -> Result<()> {
        if self.journal.lock().unwrap().fail_transition {
            return Err(Error::BackendError("mock transition rejected".to_string()));
        }
        self.record(MockCommand::Transition {
            image: image_id(image),
            old: old_layout,
            new: new_layout,
        })
    }

    fn begin_rendering(&mut self, info: &RenderingInfo) -> Result<()> {
        self.record(MockCommand::BeginRendering {
            color: image_id(info.color.image.as_ref()),
            depth: info.depth.as_ref().map(|d| image_id(d.image.as_ref())),
            area: info.render_area,
            clear: info.color.clear_value,
        })
    }

    fn end_rendering(&mut self) -> Result<()> {
        self.record(MockCommand::EndRendering)
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        let mock = unsafe { &*(pipeline.as_ref() as *const dyn Pipeline as *const MockPipeline) };
        self.record(MockCommand::BindPipeline { pipeline: mock.id })
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record(MockCommand::SetViewport(viewport))
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.record(MockCommand::SetScissor(scissor))
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.record(MockCommand::Draw { vertex_count, first_vertex })
    }

    fn copy_image(&mut self, src: &dyn Image, dst: &dyn Image, region: Rect2D) -> Result<()> {
        self.record(MockCommand::CopyImage {
            src: image_id(src),
            dst: image_id(dst),
            region,
        })
    }

    fn copy_image_to_buffer(&mut self, src: &dyn Image, dst: &dyn Buffer, region: Rect2D) -> Result<()> {
        self.record(MockCommand::CopyImageToBuffer {
            src: image_id(src),
            dst: buffer_id(dst),
            region,
        })
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    journal: SharedJournal,
    surface: Option<SurfaceInfo>,
    backend: &'static str,
}

impl MockGraphicsDevice {
    /// Headless mock device (no surface)
    pub fn new() -> Self {
        Self {
            journal: Arc::new(Mutex::new(MockJournal::default())),
            surface: None,
            backend: "mock",
        }
    }

    pub fn with_surface(surface: SurfaceInfo) -> Self {
        let mut device = Self::new();
        device.surface = Some(surface);
        device
    }

    /// Pretend to be another backend
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = backend;
        self
    }

    pub fn journal(&self) -> SharedJournal {
        self.journal.clone()
    }

    pub fn set_surface(&mut self, surface: Option<SurfaceInfo>) {
        self.surface = surface;
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn backend_name(&self) -> &'static str {
        self.backend
    }

    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn Image>> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Zero-sized image '{}' ({}x{})",
                desc.label, desc.width, desc.height
            )));
        }
        let mut journal = self.journal.lock().unwrap();
        let id = journal.next_id();
        journal.events.push(MockEvent::ImageCreated(id));
        journal.image_descs.push((id, desc.clone()));
        Ok(Arc::new(MockImage {
            id,
            info: ImageInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
            },
            journal: self.journal.clone(),
        }))
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("Zero-sized buffer '{}'", desc.label)));
        }
        let mut journal = self.journal.lock().unwrap();
        let id = journal.next_id();
        journal.events.push(MockEvent::BufferCreated(id));
        journal.buffer_descs.push((id, desc.clone()));
        Ok(Arc::new(MockBuffer {
            id,
            data: vec![0x7F; desc.size as usize],
            journal: self.journal.clone(),
        }))
    }

    fn create_shader(&mut self, desc: ShaderDesc) -> Result<Arc<dyn Shader>> {
        if desc.code.is_empty() {
            return Err(Error::InvalidResource("Empty shader blob".to_string()));
        }
        let mut journal = self.journal.lock().unwrap();
        let id = journal.next_id();
        journal.events.push(MockEvent::ShaderCreated(id));
        journal.shader_blobs.push((id, desc.stage, desc.code.len()));
        Ok(Arc::new(MockShader {
            id,
            stage: desc.stage,
            journal: self.journal.clone(),
        }))
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        let mut journal = self.journal.lock().unwrap();
        let id = journal.next_id();
        journal.events.push(MockEvent::PipelineCreated(id));
        Ok(Arc::new(MockPipeline {
            id,
            color_format: desc.color_format,
            depth_format: desc.depth_format,
            journal: self.journal.clone(),
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        let mut journal = self.journal.lock().unwrap();
        let id = journal.next_id();
        journal.events.push(MockEvent::CommandListCreated(id));
        Ok(Box::new(MockCommandList {
            id,
            is_recording: false,
            journal: self.journal.clone(),
        }))
    }

    fn submit(&self, command_lists: &[&dyn CommandList]) -> Result<()> {
        let mut ids = Vec::with_capacity(command_lists.len());
        for list in command_lists {
            let mock = unsafe { &*(*list as *const dyn CommandList as *const MockCommandList) };
            if mock.is_recording {
                return Err(Error::BackendError(format!(
                    "Command list {} submitted while still recording",
                    mock.id
                )));
            }
            ids.push(mock.id);
        }

        let mut journal = self.journal.lock().unwrap();
        if journal.fail_submit {
            return Err(Error::BackendError("mock submit rejected".to_string()));
        }
        journal.events.push(MockEvent::Submit { command_lists: ids });
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.journal.lock().unwrap().events.push(MockEvent::WaitIdle);
        Ok(())
    }

    fn surface(&self) -> Option<SurfaceInfo> {
        self.surface
    }
}

// ============================================================================
// Mock DeviceFactory
// ============================================================================

/// Factory producing headless mock devices, remembering the last journal
pub struct MockDeviceFactory {
    pub created: Mutex<Vec<SharedJournal>>,
}

impl MockDeviceFactory {
    pub fn new() -> Self {
        Self { created: Mutex::new(Vec::new()) }
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn last_journal(&self) -> Option<SharedJournal> {
        self.created.lock().unwrap().last().cloned()
    }
}

impl DeviceFactory for MockDeviceFactory {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    fn create_headless(&self) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let device = MockGraphicsDevice::new();
        self.created.lock().unwrap().push(device.journal());
        Ok(Arc::new(Mutex::new(device)))
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
