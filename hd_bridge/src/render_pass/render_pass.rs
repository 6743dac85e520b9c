/// Render pass - the object the host executes once per frame
///
/// Construction resolves the presentation strategy from the device handle
/// and loads shaders. Each execution ensures the viewport resources, records
/// the frame and hands it to the presentation bridge. Dropping the render
/// pass drains the device and releases everything it allocated.

use std::sync::{Arc, Mutex, MutexGuard};
use crate::error::{Error, Result};
use crate::delegate::{DeviceHandle, PresentationMode, SharedSettings};
use crate::device::{CommandList, GraphicsDevice, ImageLayout, Rect2D};
use crate::render_pass::{
    DrawParams, FrameSequencer, FrameState, PresentationBridge, RenderPassConfig,
    RenderPassState, RprimCollection, ShaderCache, SharedForeignContext, ViewportResourceSet,
    resolve_viewport,
};
use crate::{engine_coding_error, engine_debug, engine_error, engine_info, engine_trace, engine_warn};

/// How a single execution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was recorded and presented
    Presented,
    /// Nothing was recorded (no usable viewport, or no frame record)
    Skipped,
}

pub struct RenderPass {
    collection: RprimCollection,
    device: DeviceHandle,
    settings: SharedSettings,
    config: RenderPassConfig,
    shaders: ShaderCache,
    resources: ViewportResourceSet,
    sequencer: FrameSequencer,
    bridge: PresentationBridge,
    /// Engine-held command list (Manual mode only)
    command_list: Option<Box<dyn CommandList>>,
}

fn lock_device(device: &Arc<Mutex<dyn GraphicsDevice>>) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Error::BackendError("Graphics device mutex poisoned".to_string()))
}

impl RenderPass {
    /// Create a render pass
    ///
    /// An owned device means Manual mode, which requires the host rendering
    /// context the frames are displayed through.
    pub fn new(
        device: DeviceHandle,
        collection: RprimCollection,
        settings: SharedSettings,
        foreign_context: Option<SharedForeignContext>,
        config: RenderPassConfig,
    ) -> Result<Self> {
        let mode = device.presentation_mode();
        let bridge = match mode {
            PresentationMode::Direct => PresentationBridge::direct(),
            PresentationMode::Manual => match foreign_context {
                Some(context) => PresentationBridge::manual(context),
                None => {
                    return Err(Error::InitializationFailed(
                        "Manual presentation requires a host rendering context".to_string(),
                    ))
                }
            },
        };

        let device_arc = device.device().clone();
        let mut guard = lock_device(&device_arc)?;

        let mut shaders = ShaderCache::new();
        shaders.load(&mut *guard, &config)?;

        let command_list = match mode {
            PresentationMode::Manual => Some(guard.create_command_list()?),
            PresentationMode::Direct => None,
        };
        drop(guard);

        engine_info!("hdbridge::RenderPass", "Created render pass collection={} mode={:?} backend={}",
            collection.name, mode, device_backend(&device_arc));

        Ok(Self {
            collection,
            device,
            settings,
            config,
            shaders,
            resources: ViewportResourceSet::new(),
            sequencer: FrameSequencer::new(),
            bridge,
            command_list,
        })
    }

    pub fn collection(&self) -> &RprimCollection {
        &self.collection
    }

    pub fn presentation_mode(&self) -> PresentationMode {
        self.bridge.mode()
    }

    pub fn frame_state(&self) -> FrameState {
        self.sequencer.state()
    }

    pub fn frames_completed(&self) -> u64 {
        self.sequencer.frames_completed()
    }

    pub fn resources(&self) -> &ViewportResourceSet {
        &self.resources
    }

    pub fn shaders(&self) -> &ShaderCache {
        &self.shaders
    }

    /// Execute one frame
    ///
    /// A failed graphics API call leaves the command list in an unknown state
    /// and cannot be recovered from: it is logged and the thread panics.
    pub fn execute(&mut self, state: &RenderPassState, render_tags: &[String]) -> FrameOutcome {
        match self.try_execute(state, render_tags) {
            Ok(outcome) => outcome,
            Err(e) => {
                engine_error!("hdbridge::RenderPass", "Fatal error while executing frame: {}", e);
                panic!("hdbridge: fatal error while executing frame: {}", e);
            }
        }
    }

    /// Execute one frame, returning graphics API failures to the caller
    ///
    /// On failure the partial frame is abandoned: the sequencer returns to
    /// `Idle`, the engine command list is reset and the color target is
    /// treated as `Undefined`, so the next call starts from a clean state.
    pub fn try_execute(&mut self, state: &RenderPassState, render_tags: &[String]) -> Result<FrameOutcome> {
        engine_trace!("hdbridge::RenderPass", "Execute collection={} tags={:?}", self.collection.name, render_tags);

        let result = self.run_frame(state);
        if result.is_err() {
            self.abandon_frame();
        }
        result
    }

    fn abandon_frame(&mut self) {
        self.sequencer.reset();
        if let Some(resources) = self.resources.current_mut() {
            resources.color_layout = ImageLayout::Undefined;
        }
        if let Some(command_list) = self.command_list.as_mut() {
            if let Err(e) = command_list.reset() {
                engine_warn!("hdbridge::RenderPass", "Failed to reset command list after a failed frame: {}", e);
            }
        }
    }

    fn run_frame(&mut self, state: &RenderPassState) -> Result<FrameOutcome> {
        let mode = self.bridge.mode();

        // Direct mode renders into the host frame or not at all
        let frame = match mode {
            PresentationMode::Direct => {
                let frame = self
                    .settings
                    .read()
                    .map_err(|_| Error::BackendError("Render settings lock poisoned".to_string()))?
                    .current_frame();
                match frame {
                    Some(frame) => Some(frame),
                    None => {
                        engine_coding_error!("hdbridge::RenderPass",
                            "No CurrentFrame record delivered for a render pass on a host device");
                        return Ok(FrameOutcome::Skipped);
                    }
                }
            }
            PresentationMode::Manual => None,
        };

        let device_arc = self.device.device().clone();
        let mut device = lock_device(&device_arc)?;
        let surface = device.surface();

        let ambient = match mode {
            PresentationMode::Manual => self.bridge.host_viewport(),
            PresentationMode::Direct => surface.map(|s| s.viewport.to_rect()),
        };
        let viewport = match resolve_viewport(state, ambient) {
            Some(viewport) => viewport,
            None => {
                engine_warn!("hdbridge::RenderPass",
                    "No usable viewport (requested {:?}, ambient {:?}), skipping frame",
                    state.requested_viewport(), ambient);
                return Ok(FrameOutcome::Skipped);
            }
        };

        let color_format = surface
            .map(|s| s.format)
            .unwrap_or(self.config.fallback_color_format);
        let depth_format = self.config.depth_format;

        let resources = self.resources.ensure(
            &mut *device,
            viewport.width,
            viewport.height,
            mode,
            color_format,
            depth_format,
        )?;
        // The held color target decides the attachment format, not the surface
        let pipeline = self.shaders.pipeline(&mut *device, resources.color_format(), depth_format)?;
        let params = DrawParams {
            pipeline: &pipeline,
            clear_color: self.config.clear_color,
            vertex_count: self.config.vertex_count,
        };

        self.sequencer.advance(FrameState::CommandAcquired)?;

        match frame {
            Some(frame) => {
                // The host list is already reset and recording
                let mut command_list = frame
                    .command_list
                    .lock()
                    .map_err(|_| Error::BackendError("Frame command list mutex poisoned".to_string()))?;
                self.sequencer.advance(FrameState::Recording)?;
                self.sequencer.record(command_list.as_mut(), resources, &params)?;

                let scissor = surface
                    .map(|s| s.scissor)
                    .unwrap_or_else(|| Rect2D::from_extent(viewport.width, viewport.height));
                let copied = self.bridge.present_direct(
                    command_list.as_mut(),
                    resources,
                    frame.back_buffer.as_ref(),
                    scissor,
                )?;
                engine_trace!("hdbridge::RenderPass", "Direct copy region {:?}", copied);
            }
            None => {
                let command_list = self
                    .command_list
                    .as_mut()
                    .ok_or_else(|| Error::InvalidResource("Manual render pass without a command list".to_string()))?;
                command_list.begin()?;
                self.sequencer.advance(FrameState::Recording)?;
                self.sequencer.record(command_list.as_mut(), resources, &params)?;
                self.bridge.present_manual(&*device, command_list.as_mut(), resources)?;
            }
        }

        self.sequencer.advance(FrameState::Resolved)?;
        self.sequencer.advance(FrameState::Idle)?;
        Ok(FrameOutcome::Presented)
    }
}

fn device_backend(device: &Arc<Mutex<dyn GraphicsDevice>>) -> &'static str {
    device.lock().map(|d| d.backend_name()).unwrap_or("unknown")
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        engine_debug!("hdbridge::RenderPass", "Destroying render pass collection={}", self.collection.name);

        if let Ok(device) = self.device.device().lock() {
            if let Err(e) = device.wait_idle() {
                engine_error!("hdbridge::RenderPass", "wait_idle failed during teardown: {}", e);
            }
        }

        self.command_list = None;
        self.resources.release();
        self.shaders.release();
        // Host-side texture and framebuffer go with the bridge
        self.bridge = PresentationBridge::direct();
    }
}

#[cfg(test)]
#[path = "render_pass_tests.rs"]
mod tests;
