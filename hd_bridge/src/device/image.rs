/// Image trait, image descriptor, and image info

use bitflags::bitflags;

/// Image pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ImageFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl ImageFormat {
    /// Size of one texel in bytes
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            ImageFormat::R8G8B8A8_SRGB
            | ImageFormat::R8G8B8A8_UNORM
            | ImageFormat::B8G8R8A8_SRGB
            | ImageFormat::B8G8R8A8_UNORM => 4,
            ImageFormat::R16G16B16A16_SFLOAT => 8,
            ImageFormat::R32G32B32A32_SFLOAT => 16,
            ImageFormat::D16_UNORM => 2,
            ImageFormat::D32_FLOAT | ImageFormat::D24_UNORM_S8_UINT => 4,
        }
    }

    /// Returns true for depth (and depth/stencil) formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            ImageFormat::D16_UNORM | ImageFormat::D32_FLOAT | ImageFormat::D24_UNORM_S8_UINT
        )
    }

    /// Returns true if the format carries a stencil aspect
    pub fn has_stencil(&self) -> bool {
        matches!(self, ImageFormat::D24_UNORM_S8_UINT)
    }
}

bitflags! {
    /// Image usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        /// Image can be rendered into as a color attachment
        const COLOR_ATTACHMENT = 1 << 0;
        /// Image can be used as depth/stencil attachment
        const DEPTH_ATTACHMENT = 1 << 1;
        /// Image can be the source of copies
        const TRANSFER_SRC = 1 << 2;
        /// Image can be the destination of copies
        const TRANSFER_DST = 1 << 3;
        /// Image can be sampled in shaders
        const SAMPLED = 1 << 4;
    }
}

/// Layout an image is in from the GPU's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Contents are undefined (freshly created or discarded)
    Undefined,
    /// Writable as a color attachment
    ColorAttachment,
    /// Writable as a depth attachment
    DepthAttachment,
    /// Readable by copy commands
    TransferSrc,
    /// Writable by copy commands
    TransferDst,
    /// Ready for presentation by the host
    PresentSrc,
}

// ===== IMAGE DESC =====

/// Descriptor for creating an image
#[derive(Debug, Clone)]
pub struct ImageDesc {
    /// Debug label (used for allocator bookkeeping)
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: ImageFormat,
    /// Usage flags
    pub usage: ImageUsage,
}

// ===== IMAGE INFO =====

/// Read-only properties of a created image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: ImageFormat,
    /// Usage flags
    pub usage: ImageUsage,
}

impl ImageInfo {
    /// (width, height)
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes needed to hold the whole image tightly packed
    pub fn byte_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel() as u64
    }
}

// ===== IMAGE TRAIT =====

/// Image resource trait
///
/// Implemented by backend-specific image types (e.g., VulkanImage).
/// Owned images are destroyed when dropped; imported host images are not.
pub trait Image: Send + Sync {
    /// Get the read-only properties of this image
    fn info(&self) -> &ImageInfo;
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
