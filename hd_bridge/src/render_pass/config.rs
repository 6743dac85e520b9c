/// Render pass configuration

use std::path::PathBuf;
use crate::delegate::{RenderSettings, DEVICE_BINDING_TOKEN, ENABLE_DEPTH, RESOURCE_ROOT, SHADER_DIRECTORY};
use crate::device::{ImageFormat, ShaderStage};

/// Stable key of a cached shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderId {
    /// Mesh vertex shader
    MeshVs,
    /// Unlit pixel shader
    UnlitPs,
}

/// Precompiled shader binary on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderAsset {
    pub id: ShaderId,
    /// File name inside the shader directory
    pub file_name: String,
    pub stage: ShaderStage,
    pub entry_point: String,
}

impl ShaderAsset {
    pub fn new(id: ShaderId, file_name: &str, stage: ShaderStage) -> Self {
        Self {
            id,
            file_name: file_name.to_string(),
            stage,
            entry_point: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderPassConfig {
    /// Plugin-relative root every asset path is resolved against
    pub resource_root: PathBuf,
    /// Shader directory under `resource_root`
    pub shader_dir: PathBuf,
    pub shaders: Vec<ShaderAsset>,
    pub clear_color: [f32; 4],
    /// Color format when the device has no surface
    pub fallback_color_format: ImageFormat,
    /// `None` renders without a depth attachment
    pub depth_format: Option<ImageFormat>,
    /// Vertices drawn per frame
    pub vertex_count: u32,
    /// Driver name a host device is offered under
    pub device_binding_token: String,
}

impl Default for RenderPassConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("."),
            shader_dir: PathBuf::from("assets"),
            shaders: vec![
                ShaderAsset::new(ShaderId::MeshVs, "TriangleVert.spv", ShaderStage::Vertex),
                ShaderAsset::new(ShaderId::UnlitPs, "TriangleFrag.spv", ShaderStage::Fragment),
            ],
            clear_color: [0.0, 1.0, 0.0, 1.0],
            fallback_color_format: ImageFormat::R8G8B8A8_UNORM,
            depth_format: Some(ImageFormat::D32_FLOAT),
            vertex_count: 3,
            device_binding_token: DEVICE_BINDING_TOKEN.to_string(),
        }
    }
}

impl RenderPassConfig {
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Full path of a shader asset
    pub fn shader_path(&self, asset: &ShaderAsset) -> PathBuf {
        self.resource_root.join(&self.shader_dir).join(&asset.file_name)
    }

    /// Apply the optional overrides found in `settings`
    pub fn apply_settings(&mut self, settings: &RenderSettings) {
        if let Some(root) = settings.get(RESOURCE_ROOT).and_then(|v| v.as_str()) {
            self.resource_root = PathBuf::from(root);
        }
        if let Some(dir) = settings.get(SHADER_DIRECTORY).and_then(|v| v.as_str()) {
            self.shader_dir = PathBuf::from(dir);
        }
        match settings.get(ENABLE_DEPTH).and_then(|v| v.as_bool()) {
            Some(false) => self.depth_format = None,
            Some(true) if self.depth_format.is_none() => self.depth_format = Some(ImageFormat::D32_FLOAT),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
