/// Frame execution sequencer
///
/// Explicit per-invocation state machine:
///
/// `Idle -> CommandAcquired -> Recording -> BarrierToWrite -> Drawing ->
/// BarrierToReadout -> Resolved -> Idle`
///
/// `record` performs the recording half of the frame (layout transition to
/// write, the rendering scope, transition to readout). Presentation is left
/// to the `PresentationBridge`.

use std::fmt;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::device::{
    CommandList, Pipeline, ImageLayout, RenderingInfo, AttachmentInfo, LoadOp, StoreOp,
    ClearValue, Viewport,
};
use crate::render_pass::ViewportResources;
use crate::engine_trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    CommandAcquired,
    Recording,
    BarrierToWrite,
    Drawing,
    BarrierToReadout,
    Resolved,
}

impl FrameState {
    /// The only state reachable from `self`
    pub fn successor(&self) -> FrameState {
        match self {
            FrameState::Idle => FrameState::CommandAcquired,
            FrameState::CommandAcquired => FrameState::Recording,
            FrameState::Recording => FrameState::BarrierToWrite,
            FrameState::BarrierToWrite => FrameState::Drawing,
            FrameState::Drawing => FrameState::BarrierToReadout,
            FrameState::BarrierToReadout => FrameState::Resolved,
            FrameState::Resolved => FrameState::Idle,
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What gets drawn inside the rendering scope
pub struct DrawParams<'a> {
    pub pipeline: &'a Arc<dyn Pipeline>,
    pub clear_color: [f32; 4],
    pub vertex_count: u32,
}

#[derive(Debug)]
pub struct FrameSequencer {
    state: FrameState,
    frames_completed: u64,
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSequencer {
    pub fn new() -> Self {
        Self {
            state: FrameState::Idle,
            frames_completed: 0,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Move to `next`, rejecting anything but the successor of the current state
    pub fn advance(&mut self, next: FrameState) -> Result<()> {
        if self.state.successor() != next {
            return Err(Error::BackendError(format!(
                "Illegal frame state transition {} -> {}",
                self.state, next
            )));
        }
        engine_trace!("hdbridge::FrameSequencer", "{} -> {}", self.state, next);
        if next == FrameState::Idle {
            self.frames_completed += 1;
        }
        self.state = next;
        Ok(())
    }

    /// Abandon the current frame after a failure
    pub fn reset(&mut self) {
        self.state = FrameState::Idle;
    }

    /// Record the frame into `command_list`, which must be recording and
    /// the sequencer in `Recording`
    ///
    /// Leaves the color target in `TransferSrc` and the sequencer in
    /// `BarrierToReadout`.
    pub fn record(
        &mut self,
        command_list: &mut dyn CommandList,
        resources: &mut ViewportResources,
        params: &DrawParams,
    ) -> Result<()> {
        // Layout transition to write
        self.advance(FrameState::BarrierToWrite)?;
        command_list.transition_image(
            resources.color.as_ref(),
            resources.color_layout,
            ImageLayout::ColorAttachment,
        )?;
        resources.color_layout = ImageLayout::ColorAttachment;
        if let Some(depth) = &resources.depth {
            command_list.transition_image(depth.as_ref(), ImageLayout::Undefined, ImageLayout::DepthAttachment)?;
        }

        // Render commands
        self.advance(FrameState::Drawing)?;
        let area = resources.rect();
        command_list.begin_rendering(&RenderingInfo {
            render_area: area,
            color: AttachmentInfo {
                image: resources.color.clone(),
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                clear_value: ClearValue::Color(params.clear_color),
            },
            depth: resources.depth.as_ref().map(|depth| AttachmentInfo {
                image: depth.clone(),
                load_op: LoadOp::Clear,
                store_op: StoreOp::DontCare,
                clear_value: ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            }),
        })?;
        command_list.bind_pipeline(params.pipeline)?;
        command_list.set_viewport(Viewport::from_rect(area))?;
        command_list.set_scissor(area)?;
        command_list.draw(params.vertex_count, 0)?;
        command_list.end_rendering()?;

        // Layout transition to readout
        self.advance(FrameState::BarrierToReadout)?;
        command_list.transition_image(
            resources.color.as_ref(),
            ImageLayout::ColorAttachment,
            ImageLayout::TransferSrc,
        )?;
        resources.color_layout = ImageLayout::TransferSrc;

        Ok(())
    }
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
