/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use crate::error::Result;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Source of copy commands
        const TRANSFER_SRC = 1 << 0;
        /// Destination of copy commands (readback staging)
        const TRANSFER_DST = 1 << 1;
        /// Vertex buffer
        const VERTEX = 1 << 2;
        /// Uniform/constant buffer
        const UNIFORM = 1 << 3;
    }
}

/// Where the memory backing a resource lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLocation {
    /// Device-local, not host visible
    GpuOnly,
    /// Host visible, written by the CPU and read by the GPU
    CpuToGpu,
    /// Host visible and cached, written by the GPU and read back by the CPU
    GpuToCpu,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Debug label
    pub label: String,
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Memory location
    pub location: MemoryLocation,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The buffer is automatically destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Host-visible contents of the buffer
    ///
    /// Only valid for `CpuToGpu` and `GpuToCpu` buffers. The caller must make
    /// sure the GPU has finished writing (e.g. after `wait_idle`).
    fn map(&self) -> Result<&[u8]>;
}
