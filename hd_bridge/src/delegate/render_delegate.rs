/// Render delegate - entry point the host scene renderer talks to
///
/// Resolves the device once from the host drivers, hands out prims and
/// creates render passes that share its device, settings and host context.

use std::convert::Infallible;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::delegate::{
    Driver, DeviceFactory, DeviceHandle, Mesh, RenderSettings, SettingValue, SharedSettings,
    resolve_device,
};
use crate::render_pass::{RenderPass, RenderPassConfig, RprimCollection, SharedForeignContext};
use crate::{engine_coding_error, engine_info, engine_trace, engine_warn};

/// Prim types this delegate never instantiates
pub type UnsupportedPrim = Infallible;

const SUPPORTED_RPRIM_TYPES: &[&str] = &["mesh"];
const SUPPORTED_SPRIM_TYPES: &[&str] = &["camera"];
const SUPPORTED_BPRIM_TYPES: &[&str] = &[];

pub struct RenderDelegate {
    factory: Arc<dyn DeviceFactory>,
    config: RenderPassConfig,
    settings: SharedSettings,
    device: Option<DeviceHandle>,
    foreign_context: Option<SharedForeignContext>,
}

impl RenderDelegate {
    pub fn new(factory: Arc<dyn DeviceFactory>, config: RenderPassConfig) -> Self {
        Self::with_settings(factory, config, RenderSettings::new())
    }

    pub fn with_settings(
        factory: Arc<dyn DeviceFactory>,
        config: RenderPassConfig,
        settings: RenderSettings,
    ) -> Self {
        engine_info!("hdbridge::RenderDelegate", "Creating render delegate ({})", factory.backend_name());
        Self {
            factory,
            config,
            settings: settings.shared(),
            device: None,
            foreign_context: None,
        }
    }

    // ===== DEVICE =====

    /// Resolve the device from the host drivers
    ///
    /// Runs once; later calls keep the first resolution.
    pub fn set_drivers(&mut self, drivers: &[Driver]) -> Result<()> {
        if self.device.is_some() {
            engine_warn!("hdbridge::RenderDelegate", "Drivers already set, ignoring {} new driver(s)", drivers.len());
            return Ok(());
        }
        let token = self.config.device_binding_token.clone();
        self.device = Some(resolve_device(drivers, &token, self.factory.as_ref())?);
        Ok(())
    }

    pub fn device_handle(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    // ===== SETTINGS =====

    pub fn settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    pub fn set_render_setting(&self, key: &str, value: SettingValue) {
        match self.settings.write() {
            Ok(mut settings) => settings.set(key, value),
            Err(_) => engine_warn!("hdbridge::RenderDelegate", "Settings lock poisoned, dropping '{}'", key),
        }
    }

    pub fn render_setting(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok().and_then(|s| s.get(key).cloned())
    }

    pub fn config(&self) -> &RenderPassConfig {
        &self.config
    }

    /// Host rendering context used to display frames in Manual mode
    pub fn set_foreign_context(&mut self, context: SharedForeignContext) {
        self.foreign_context = Some(context);
    }

    // ===== PRIM TYPES =====

    pub fn supported_rprim_types(&self) -> &'static [&'static str] {
        SUPPORTED_RPRIM_TYPES
    }

    pub fn supported_sprim_types(&self) -> &'static [&'static str] {
        SUPPORTED_SPRIM_TYPES
    }

    pub fn supported_bprim_types(&self) -> &'static [&'static str] {
        SUPPORTED_BPRIM_TYPES
    }

    pub fn create_rprim(&self, type_id: &str, id: &str) -> Option<Mesh> {
        if type_id == "mesh" {
            engine_trace!("hdbridge::RenderDelegate", "Create rprim type={} id={}", type_id, id);
            return Some(Mesh::new(id));
        }
        engine_coding_error!("hdbridge::RenderDelegate", "Unknown Rprim type={} id={}", type_id, id);
        None
    }

    pub fn destroy_rprim(&self, mesh: Mesh) {
        engine_trace!("hdbridge::RenderDelegate", "Destroy rprim id={}", mesh.id());
    }

    pub fn create_sprim(&self, type_id: &str, id: &str) -> Option<UnsupportedPrim> {
        engine_coding_error!("hdbridge::RenderDelegate", "Unknown Sprim type={} id={}", type_id, id);
        None
    }

    pub fn create_fallback_sprim(&self, type_id: &str) -> Option<UnsupportedPrim> {
        engine_coding_error!("hdbridge::RenderDelegate", "Creating unknown fallback sprim type={}", type_id);
        None
    }

    pub fn destroy_sprim(&self, id: &str) {
        engine_coding_error!("hdbridge::RenderDelegate", "Destroy Sprim not supported (id={})", id);
    }

    pub fn create_bprim(&self, type_id: &str, id: &str) -> Option<UnsupportedPrim> {
        engine_coding_error!("hdbridge::RenderDelegate", "Unknown Bprim type={} id={}", type_id, id);
        None
    }

    pub fn create_fallback_bprim(&self, type_id: &str) -> Option<UnsupportedPrim> {
        engine_coding_error!("hdbridge::RenderDelegate", "Creating unknown fallback bprim type={}", type_id);
        None
    }

    pub fn destroy_bprim(&self, id: &str) {
        engine_coding_error!("hdbridge::RenderDelegate", "Destroy Bprim not supported (id={})", id);
    }

    pub fn create_instancer(&self, id: &str) -> Option<UnsupportedPrim> {
        engine_coding_error!("hdbridge::RenderDelegate", "Creating Instancer not supported id={}", id);
        None
    }

    pub fn destroy_instancer(&self, id: &str) {
        engine_coding_error!("hdbridge::RenderDelegate", "Destroy instancer not supported (id={})", id);
    }

    // ===== RENDER PASSES =====

    /// Create a render pass bound to the resolved device
    pub fn create_render_pass(&self, collection: RprimCollection) -> Result<RenderPass> {
        let device = self.device.clone().ok_or_else(|| {
            Error::InitializationFailed("Render pass requested before drivers were set".to_string())
        })?;

        engine_info!("hdbridge::RenderDelegate", "Create render pass with collection={}", collection.name);

        let mut config = self.config.clone();
        if let Ok(settings) = self.settings.read() {
            config.apply_settings(&settings);
        }

        RenderPass::new(
            device,
            collection,
            self.settings.clone(),
            self.foreign_context.clone(),
            config,
        )
    }

    pub fn commit_resources(&self) {
        engine_trace!("hdbridge::RenderDelegate", "Commit resources");
    }
}

impl Drop for RenderDelegate {
    fn drop(&mut self) {
        engine_info!("hdbridge::RenderDelegate", "Destroying render delegate");
    }
}

#[cfg(test)]
#[path = "render_delegate_tests.rs"]
mod tests;
