/// Device module - backend-agnostic GPU device contract
///
/// The render pass only ever talks to these traits. Concrete backends
/// (e.g. `hd_bridge_vulkan`) implement them; tests use the mock device.

pub mod graphics_device;
pub mod image;
pub mod buffer;
pub mod shader;
pub mod pipeline;
pub mod command_list;

#[cfg(test)]
pub mod mock_graphics_device;

pub use graphics_device::*;
pub use image::*;
pub use buffer::*;
pub use shader::*;
pub use pipeline::*;
pub use command_list::*;
