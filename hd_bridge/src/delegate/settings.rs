/// Keyed render settings shared between the host and render passes
///
/// The host delivers per-frame data (the `CurrentFrame` record in Direct
/// mode) and configuration overrides through this map rather than through
/// typed parameters.

use std::sync::{Arc, RwLock};
use rustc_hash::FxHashMap;
use crate::render_pass::Frame;

/// Per-frame `Frame` record (Direct mode)
pub const CURRENT_FRAME: &str = "CurrentFrame";
/// Override of the shader asset directory
pub const SHADER_DIRECTORY: &str = "shaderDirectory";
/// Override of the plugin-relative resource root
pub const RESOURCE_ROOT: &str = "resourceRoot";
/// Enable or disable the depth attachment
pub const ENABLE_DEPTH: &str = "enableDepth";

/// Tagged setting value
#[derive(Debug, Clone)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Frame(Frame),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(v) => Some(*v),
            SettingValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            SettingValue::Frame(v) => Some(v),
            _ => None,
        }
    }
}

/// Settings map
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    values: FxHashMap<String, SettingValue>,
}

/// Settings shared by a render delegate and all its render passes
pub type SharedSettings = Arc<RwLock<RenderSettings>>;

impl RenderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }

    pub fn set(&mut self, key: impl Into<String>, value: SettingValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `CurrentFrame` record, if the host delivered one
    pub fn current_frame(&self) -> Option<Frame> {
        self.get(CURRENT_FRAME).and_then(|v| v.as_frame()).cloned()
    }

    /// Deliver the frame record for the next execution
    pub fn set_current_frame(&mut self, frame: Frame) {
        self.set(CURRENT_FRAME, SettingValue::Frame(frame));
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
