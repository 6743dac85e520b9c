//! Error types for the HdBridge render-pass engine
//!
//! This module defines the error types used throughout the engine,
//! including device resolution, resource allocation and frame recording.

use std::fmt;

/// Result type for HdBridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// HdBridge engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan command rejected, submission failed, ...)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (image, buffer, shader, degenerate extent, ...)
    InvalidResource(String),

    /// Initialization failed (device, render pass, shader assets)
    InitializationFailed(String),

    /// Requested prim or resource type is not supported by this delegate
    UnsupportedType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedType(msg) => write!(f, "Unsupported type: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
