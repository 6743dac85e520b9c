/// Mesh rprim - the only geometry prim type the delegate accepts

use bitflags::bitflags;
use crate::engine_trace;

bitflags! {
    /// Change-tracking bits exchanged with the scene index
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyBits: u32 {
        const CLEAN = 0;
        const INIT_REPR = 1 << 0;
        const VARYING = 1 << 1;
        const DIRTY_PRIM_ID = 1 << 2;
        const DIRTY_EXTENT = 1 << 3;
        const DIRTY_DISPLAY_STYLE = 1 << 4;
        const DIRTY_POINTS = 1 << 5;
        const DIRTY_PRIMVAR = 1 << 6;
        const DIRTY_MATERIAL_ID = 1 << 7;
        const DIRTY_TOPOLOGY = 1 << 8;
        const DIRTY_TRANSFORM = 1 << 9;
        const DIRTY_VISIBILITY = 1 << 10;
    }
}

/// Mesh rprim
///
/// Geometry is not extracted; the render pass draws a fixed primitive. The
/// mesh only takes part in change tracking.
#[derive(Debug, Clone)]
pub struct Mesh {
    id: String,
    sync_count: u64,
}

impl Mesh {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sync_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bits set when the mesh is first inserted
    pub fn initial_dirty_bits_mask(&self) -> DirtyBits {
        DirtyBits::CLEAN | DirtyBits::DIRTY_TRANSFORM
    }

    pub fn propagate_dirty_bits(&self, bits: DirtyBits) -> DirtyBits {
        bits
    }

    /// Consume the transform bit; other bits are left for their owners
    pub fn sync(&mut self, dirty_bits: &mut DirtyBits, repr: &str) {
        engine_trace!("hdbridge::Mesh", "Sync mesh '{}' repr='{}' bits={:?}", self.id, repr, dirty_bits);
        dirty_bits.remove(DirtyBits::DIRTY_TRANSFORM);
        self.sync_count += 1;
    }

    /// Number of times `sync` ran
    pub fn sync_count(&self) -> u64 {
        self.sync_count
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
