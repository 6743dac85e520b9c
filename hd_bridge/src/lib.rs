/*!
# HdBridge

Per-frame GPU render-pass engine for a host scene renderer.

This crate provides the backend-agnostic part: device traits, the render pass
(viewport-sized resources, shader cache, frame sequencer, presentation bridge)
and the render delegate the host talks to. Backends (e.g. `hd_bridge_vulkan`)
implement the device traits.

## Architecture

- **GraphicsDevice**: Factory trait for GPU resources, queue submission and idle wait
- **DeviceHandle**: Owned (headless, engine-created) or Borrowed (host) device
- **RenderDelegate**: Resolves the device from host drivers, creates prims and render passes
- **RenderPass**: Executes one frame, presenting either Direct (GPU copy into the
  host backbuffer) or Manual (readback + upload into the host rendering context)
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod delegate;
pub mod render_pass;

// Main hdbridge namespace module
pub mod hdbridge {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine (logger slot)
    pub use crate::engine::Engine;

    // Device factory trait
    pub use crate::device::GraphicsDevice;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device sub-module with all resource traits and value types
    pub mod device {
        pub use crate::device::*;
    }

    // Delegate sub-module
    pub mod delegate {
        pub use crate::delegate::*;
    }

    // Render pass sub-module
    pub mod render_pass {
        pub use crate::render_pass::*;
    }
}

// Re-export math library at crate root
pub use glam;
