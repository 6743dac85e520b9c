/// Shader resource cache owned by one render pass
///
/// Binary blobs are read from disk once at render pass creation and kept
/// until the render pass is destroyed. The graphics pipeline built from them
/// is cached per attachment format pair.

use std::fs;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::device::{
    GraphicsDevice, Shader, Pipeline, ShaderDesc, PipelineDesc, ImageFormat,
    PrimitiveTopology, CullMode,
};
use crate::render_pass::{RenderPassConfig, ShaderId};
use crate::{engine_debug, engine_error};

struct CachedPipeline {
    color_format: ImageFormat,
    depth_format: Option<ImageFormat>,
    pipeline: Arc<dyn Pipeline>,
}

#[derive(Default)]
pub struct ShaderCache {
    shaders: FxHashMap<ShaderId, Arc<dyn Shader>>,
    pipeline: Option<CachedPipeline>,
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every shader asset of `config` not already cached
    pub fn load(&mut self, device: &mut dyn GraphicsDevice, config: &RenderPassConfig) -> Result<()> {
        for asset in &config.shaders {
            if self.shaders.contains_key(&asset.id) {
                continue;
            }

            let path = config.shader_path(asset);
            let code = fs::read(&path).map_err(|e| {
                engine_error!("hdbridge::ShaderCache", "Failed to read shader '{}': {}", path.display(), e);
                Error::InitializationFailed(format!("Failed to read shader '{}': {}", path.display(), e))
            })?;

            let shader = device.create_shader(ShaderDesc {
                code: &code,
                stage: asset.stage,
                entry_point: asset.entry_point.clone(),
            })?;

            engine_debug!("hdbridge::ShaderCache", "Loaded {:?} from '{}' ({} bytes)",
                asset.id, path.display(), code.len());
            self.shaders.insert(asset.id, shader);
        }
        Ok(())
    }

    pub fn get(&self, id: ShaderId) -> Option<&Arc<dyn Shader>> {
        self.shaders.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Pipeline drawing with the cached shaders into the given formats
    ///
    /// Rebuilt only when the formats change.
    pub fn pipeline(
        &mut self,
        device: &mut dyn GraphicsDevice,
        color_format: ImageFormat,
        depth_format: Option<ImageFormat>,
    ) -> Result<Arc<dyn Pipeline>> {
        if let Some(cached) = &self.pipeline {
            if cached.color_format == color_format && cached.depth_format == depth_format {
                return Ok(cached.pipeline.clone());
            }
        }

        let vertex_shader = self.get(ShaderId::MeshVs).cloned().ok_or_else(|| {
            Error::InvalidResource("Vertex shader MeshVs is not loaded".to_string())
        })?;
        let fragment_shader = self.get(ShaderId::UnlitPs).cloned().ok_or_else(|| {
            Error::InvalidResource("Pixel shader UnlitPs is not loaded".to_string())
        })?;

        let pipeline = device.create_pipeline(PipelineDesc {
            vertex_shader,
            fragment_shader,
            topology: PrimitiveTopology::TriangleList,
            cull_mode: CullMode::None,
            color_format,
            depth_format,
        })?;

        engine_debug!("hdbridge::ShaderCache", "Built pipeline for {:?} / {:?}", color_format, depth_format);
        self.pipeline = Some(CachedPipeline {
            color_format,
            depth_format,
            pipeline: pipeline.clone(),
        });
        Ok(pipeline)
    }

    /// Drop the pipeline and every shader
    pub fn release(&mut self) {
        self.pipeline = None;
        self.shaders.clear();
    }
}

#[cfg(test)]
#[path = "shader_cache_tests.rs"]
mod tests;
