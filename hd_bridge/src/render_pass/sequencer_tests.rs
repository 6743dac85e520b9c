use super::*;
use crate::delegate::PresentationMode;
use crate::device::{GraphicsDevice, ImageFormat, PipelineDesc, PrimitiveTopology, CullMode, ShaderDesc, ShaderStage};
use crate::device::mock_graphics_device::{image_id, MockCommand, MockGraphicsDevice};
use crate::render_pass::ViewportResourceSet;

fn pipeline(device: &mut MockGraphicsDevice) -> Arc<dyn Pipeline> {
    let code = [0u8; 4];
    let vs = device
        .create_shader(ShaderDesc { code: &code, stage: ShaderStage::Vertex, entry_point: "main".to_string() })
        .unwrap();
    let fs = device
        .create_shader(ShaderDesc { code: &code, stage: ShaderStage::Fragment, entry_point: "main".to_string() })
        .unwrap();
    device
        .create_pipeline(PipelineDesc {
            vertex_shader: vs,
            fragment_shader: fs,
            topology: PrimitiveTopology::TriangleList,
            cull_mode: CullMode::None,
            color_format: ImageFormat::R8G8B8A8_UNORM,
            depth_format: Some(ImageFormat::D32_FLOAT),
        })
        .unwrap()
}

#[test]
fn test_full_cycle() {
    let mut sequencer = FrameSequencer::new();
    let mut state = FrameState::Idle;
    for _ in 0..7 {
        state = state.successor();
        sequencer.advance(state).unwrap();
    }
    assert_eq!(sequencer.state(), FrameState::Idle);
    assert_eq!(sequencer.frames_completed(), 1);
}

#[test]
fn test_illegal_transition_rejected() {
    let mut sequencer = FrameSequencer::new();
    assert!(sequencer.advance(FrameState::Drawing).is_err());
    assert_eq!(sequencer.state(), FrameState::Idle);

    sequencer.advance(FrameState::CommandAcquired).unwrap();
    assert!(sequencer.advance(FrameState::Idle).is_err());
    assert!(sequencer.advance(FrameState::CommandAcquired).is_err());
}

#[test]
fn test_reset_returns_to_idle() {
    let mut sequencer = FrameSequencer::new();
    sequencer.advance(FrameState::CommandAcquired).unwrap();
    sequencer.reset();
    assert_eq!(sequencer.state(), FrameState::Idle);
    assert_eq!(sequencer.frames_completed(), 0);
}

#[test]
fn test_record_sequence() {
    let mut device = MockGraphicsDevice::new();
    let pipeline = pipeline(&mut device);
    let mut set = ViewportResourceSet::new();
    let resources = set
        .ensure(&mut device, 800, 600, PresentationMode::Direct, ImageFormat::R8G8B8A8_UNORM, Some(ImageFormat::D32_FLOAT))
        .unwrap();
    let color = image_id(resources.color.as_ref());
    let depth = image_id(resources.depth.as_ref().unwrap().as_ref());

    let mut list = device.create_command_list().unwrap();
    list.begin().unwrap();

    let mut sequencer = FrameSequencer::new();
    sequencer.advance(FrameState::CommandAcquired).unwrap();
    sequencer.advance(FrameState::Recording).unwrap();
    sequencer
        .record(
            list.as_mut(),
            resources,
            &DrawParams { pipeline: &pipeline, clear_color: [0.0, 1.0, 0.0, 1.0], vertex_count: 3 },
        )
        .unwrap();

    assert_eq!(sequencer.state(), FrameState::BarrierToReadout);
    assert_eq!(resources.color_layout, ImageLayout::TransferSrc);

    let area = crate::device::Rect2D::from_extent(800, 600);
    let commands = device.journal().lock().unwrap().command_kinds();
    assert_eq!(
        &commands[1..],
        &[
            MockCommand::Transition { image: color, old: ImageLayout::Undefined, new: ImageLayout::ColorAttachment },
            MockCommand::Transition { image: depth, old: ImageLayout::Undefined, new: ImageLayout::DepthAttachment },
            MockCommand::BeginRendering {
                color,
                depth: Some(depth),
                area,
                clear: ClearValue::Color([0.0, 1.0, 0.0, 1.0]),
            },
            MockCommand::BindPipeline { pipeline: 3 },
            MockCommand::SetViewport(Viewport::from_rect(area)),
            MockCommand::SetScissor(area),
            MockCommand::Draw { vertex_count: 3, first_vertex: 0 },
            MockCommand::EndRendering,
            MockCommand::Transition { image: color, old: ImageLayout::ColorAttachment, new: ImageLayout::TransferSrc },
        ]
    );
}

#[test]
fn test_second_frame_starts_from_transfer_src() {
    let mut device = MockGraphicsDevice::new();
    let pipeline = pipeline(&mut device);
    let mut set = ViewportResourceSet::new();
    let resources = set
        .ensure(&mut device, 16, 16, PresentationMode::Direct, ImageFormat::R8G8B8A8_UNORM, None)
        .unwrap();
    let color = image_id(resources.color.as_ref());
    let mut list = device.create_command_list().unwrap();
    let params = DrawParams { pipeline: &pipeline, clear_color: [0.0; 4], vertex_count: 3 };
    let mut sequencer = FrameSequencer::new();

    for _ in 0..2 {
        list.begin().unwrap();
        sequencer.advance(FrameState::CommandAcquired).unwrap();
        sequencer.advance(FrameState::Recording).unwrap();
        sequencer.record(list.as_mut(), resources, &params).unwrap();
        sequencer.advance(FrameState::Resolved).unwrap();
        sequencer.advance(FrameState::Idle).unwrap();
        list.end().unwrap();
    }

    let journal = device.journal();
    let journal = journal.lock().unwrap();
    let write_transitions: Vec<ImageLayout> = journal
        .command_kinds()
        .into_iter()
        .filter_map(|c| match c {
            MockCommand::Transition { image, old, new: ImageLayout::ColorAttachment } if image == color => Some(old),
            _ => None,
        })
        .collect();
    assert_eq!(write_transitions, vec![ImageLayout::Undefined, ImageLayout::TransferSrc]);
    assert_eq!(sequencer.frames_completed(), 2);
}

#[test]
fn test_record_propagates_backend_error() {
    let mut device = MockGraphicsDevice::new();
    let pipeline = pipeline(&mut device);
    let mut set = ViewportResourceSet::new();
    let resources = set
        .ensure(&mut device, 16, 16, PresentationMode::Direct, ImageFormat::R8G8B8A8_UNORM, None)
        .unwrap();
    let mut list = device.create_command_list().unwrap();
    list.begin().unwrap();
    device.journal().lock().unwrap().fail_transition = true;

    let mut sequencer = FrameSequencer::new();
    sequencer.advance(FrameState::CommandAcquired).unwrap();
    sequencer.advance(FrameState::Recording).unwrap();
    let result = sequencer.record(
        list.as_mut(),
        resources,
        &DrawParams { pipeline: &pipeline, clear_color: [0.0; 4], vertex_count: 3 },
    );

    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(resources.color_layout, ImageLayout::Undefined);
}
