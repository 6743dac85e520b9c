/*!
# HdBridge - Vulkan Backend

Vulkan implementation of the `hd_bridge` device traits.

Uses the Ash library for Vulkan bindings and gpu-allocator for memory
management. The device is created headless (no window, no swapchain): the
host either hands its own `VulkanGraphicsDevice` to the render delegate
through the driver list, or the delegate creates one through
`VulkanDeviceFactory`.

# Example

```no_run
use std::sync::Arc;
use hd_bridge::hdbridge::delegate::RenderDelegate;
use hd_bridge::hdbridge::render_pass::RenderPassConfig;
use hd_bridge_vulkan::hdbridge::VulkanDeviceFactory;

let mut delegate = RenderDelegate::new(
    Arc::new(VulkanDeviceFactory::default()),
    RenderPassConfig::default(),
);
delegate.set_drivers(&[])?;
# Ok::<(), hd_bridge::hdbridge::Error>(())
```
*/

mod vulkan_context;
mod vulkan_format;
mod vulkan_image;
mod vulkan_buffer;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_command_list;
mod vulkan_device;
mod debug;

pub mod hdbridge {
    pub use crate::vulkan_device::{VulkanGraphicsDevice, VulkanDeviceFactory};
    pub use crate::vulkan_image::VulkanImage;
    pub use crate::vulkan_command_list::VulkanCommandList;
    pub use crate::debug::ValidationStats;
}
