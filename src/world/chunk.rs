//! Chunk data — pure data, no methods.
//!
//! Follows the `TempChunkData` / `TempChunkOperations` split this codebase
//! uses elsewhere: `ChunkData` is a flat `E^3` density array plus the
//! bookkeeping flags spec.md §3 names (`modified`, dirty-for-rebuild,
//! queued-for-rebuild, and the server-only history). All transformations
//! live in `chunk_ops.rs`.

use super::core::voxel::Density;
use crate::constants::VOXELS_PER_CHUNK;
use cgmath::Point3;

/// Per-voxel history the server keeps so it can answer "what was this
/// voxel before the current tick's writes" when building a snapshot's
/// voxel-correction block (spec.md §4.2, §4.3).
#[derive(Debug, Clone)]
pub struct ChunkHistory {
    /// Density of every voxel immediately before the first write this tick.
    pub pre_tick_densities: Box<[Density; VOXELS_PER_CHUNK]>,
    /// Linear indices of voxels written this tick, deduplicated, bounded to
    /// `VOXELS_PER_CHUNK / 4` entries (spec.md §3 invariant).
    pub touched_indices: Vec<u16>,
}

impl ChunkHistory {
    pub fn new(baseline: &[Density; VOXELS_PER_CHUNK]) -> Self {
        Self {
            pre_tick_densities: Box::new(*baseline),
            touched_indices: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct ChunkData {
    pub densities: Box<[Density; VOXELS_PER_CHUNK]>,
    /// World-space position of this chunk's (0,0,0) voxel.
    pub origin: Point3<f32>,
    /// Cached marching-cubes vertices. Empty until the first rebuild.
    pub vertices: Vec<Point3<f32>>,
    /// Set once any voxel in this chunk has ever been written.
    pub modified: bool,
    /// Set when a voxel write makes this chunk's mesh stale.
    pub mesh_dirty: bool,
    /// True while this chunk sits in the rebuild queue, so a second dirty
    /// write doesn't queue it twice (spec.md §4.2 mesh rebuild policy).
    pub queued_for_rebuild: bool,
    /// Server-only: present only while this chunk has been written to
    /// since the last snapshot emission.
    pub history: Option<ChunkHistory>,
}

impl ChunkData {
    pub fn empty(origin: Point3<f32>) -> Self {
        Self {
            densities: Box::new([Density::EMPTY; VOXELS_PER_CHUNK]),
            origin,
            vertices: Vec::new(),
            modified: false,
            mesh_dirty: false,
            queued_for_rebuild: false,
            history: None,
        }
    }

    #[inline]
    pub fn density(&self, x: u32, y: u32, z: u32) -> Density {
        self.densities[super::core::VoxelCoord::new(x, y, z).linear_index(crate::constants::CHUNK_EDGE)]
    }
}
