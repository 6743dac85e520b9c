/// VulkanShader - Vulkan implementation of the Shader trait

use hd_bridge::hdbridge::{Result, Error};
use hd_bridge::hdbridge::device::{Shader, ShaderDesc, ShaderStage};
use hd_bridge::{engine_err, engine_error};
use ash::vk;
use std::ffi::CString;
use std::io::Cursor;

/// Vulkan shader implementation
pub struct VulkanShader {
    /// Vulkan shader module
    pub(crate) module: vk::ShaderModule,
    /// Shader stage
    pub(crate) stage: ShaderStage,
    /// Entry point name
    pub(crate) entry_point: CString,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl VulkanShader {
    /// Create a shader module from a SPIR-V blob
    ///
    /// The blob does not need to be 4-byte aligned in memory, but its length
    /// must be a multiple of 4 and it must start with the SPIR-V magic number.
    pub(crate) fn new(device: &ash::Device, desc: &ShaderDesc) -> Result<Self> {
        let code = ash::util::read_spv(&mut Cursor::new(desc.code)).map_err(|e| {
            engine_error!("hdbridge::vulkan", "Invalid SPIR-V ({} bytes): {}", desc.code.len(), e);
            Error::InvalidResource(format!("Invalid SPIR-V: {}", e))
        })?;

        let entry_point = CString::new(desc.entry_point.as_str()).map_err(|_| {
            Error::InvalidResource(format!("Invalid shader entry point: {:?}", desc.entry_point))
        })?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);

        let module = unsafe {
            device
                .create_shader_module(&create_info, None)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to create shader module: {:?}", e))?
        };

        Ok(Self {
            module,
            stage: desc.stage,
            entry_point,
            device: device.clone(),
        })
    }

    /// # Safety
    ///
    /// `shader` must have been created by a `VulkanGraphicsDevice`.
    pub(crate) unsafe fn from_dyn(shader: &dyn Shader) -> &VulkanShader {
        &*(shader as *const dyn Shader as *const VulkanShader)
    }
}

impl Shader for VulkanShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for VulkanShader {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}
