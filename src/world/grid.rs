//! The chunk grid (C3): a `G^3` array of chunk slots plus the lazy
//! mesh-rebuild queue and, on the server, the bounded modified-chunk set
//! spec.md §4.2/§4.7 describe. Mirrors the `EngineBuffers::world`
//! SoA-of-state shape this codebase uses elsewhere (dirty set, pending
//! queue, tick counter) rather than scattering that bookkeeping across
//! methods on individual chunks.

use super::chunk::ChunkData;
use super::chunk_ops;
use super::core::{pack_chunk_coord, unpack_chunk_coord, world_origin, ChunkCoord, VoxelCoord};
use super::core::voxel::Density;
use super::mesh;
use crate::constants::{CHUNK_EDGE, MAX_MODIFIED_CHUNKS};
use crate::error::{NetError, NetResult};
use cgmath::Point3;
use std::collections::VecDeque;

pub struct ChunkGrid {
    pub grid_edge: u32,
    pub voxel_size: f32,
    pub surface_threshold: u8,
    slots: Vec<Option<ChunkData>>,
    rebuild_queue: VecDeque<usize>,
    /// Server-only: indices of chunks written since the last snapshot
    /// emission, capped at `MAX_MODIFIED_CHUNKS`.
    modified_chunks: Vec<usize>,
    pub is_server: bool,
}

impl ChunkGrid {
    pub fn new(grid_edge: u32, voxel_size: f32, surface_threshold: u8, is_server: bool) -> Self {
        let slot_count = (grid_edge * grid_edge * grid_edge) as usize;
        Self {
            grid_edge,
            voxel_size,
            surface_threshold,
            slots: vec![None; slot_count].into_iter().collect(),
            rebuild_queue: VecDeque::new(),
            modified_chunks: Vec::with_capacity(MAX_MODIFIED_CHUNKS),
            is_server,
        }
    }

    /// Allocate an empty chunk at `coord`, replacing any chunk already there.
    pub fn load_empty(&mut self, coord: ChunkCoord) -> NetResult<()> {
        let index = pack_chunk_coord(coord, self.grid_edge)?;
        let origin = self.chunk_world_origin(coord);
        self.slots[index] = Some(ChunkData::empty(origin));
        Ok(())
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkData> {
        let index = pack_chunk_coord(coord, self.grid_edge).ok()?;
        self.slots[index].as_ref()
    }

    pub fn chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkData> {
        let index = pack_chunk_coord(coord, self.grid_edge).ok()?;
        self.slots[index].as_mut()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunk(coord).is_some()
    }

    fn chunk_world_origin(&self, coord: ChunkCoord) -> Point3<f32> {
        let base = world_origin(self.grid_edge, CHUNK_EDGE, self.voxel_size);
        Point3::new(
            base + coord.x as f32 * CHUNK_EDGE as f32 * self.voxel_size,
            base + coord.y as f32 * CHUNK_EDGE as f32 * self.voxel_size,
            base + coord.z as f32 * CHUNK_EDGE as f32 * self.voxel_size,
        )
    }

    /// World-space position of a (possibly fractional, for mesh
    /// interpolation) in-chunk voxel coordinate.
    pub fn voxel_world_position(&self, coord: ChunkCoord, lx: f32, ly: f32, lz: f32) -> Point3<f32> {
        let origin = self.chunk_world_origin(coord);
        origin + cgmath::Vector3::new(lx, ly, lz) * self.voxel_size
    }

    /// Map a world-space point to its containing chunk coordinate and
    /// in-chunk voxel coordinate, per spec.md §4.2.
    pub fn world_to_chunk_voxel(&self, world: Point3<f32>) -> (ChunkCoord, VoxelCoord) {
        let xs = super::core::world_to_voxel_space(world.x, self.grid_edge, CHUNK_EDGE, self.voxel_size);
        let ys = super::core::world_to_voxel_space(world.y, self.grid_edge, CHUNK_EDGE, self.voxel_size);
        let zs = super::core::world_to_voxel_space(world.z, self.grid_edge, CHUNK_EDGE, self.voxel_size);

        let chunk = ChunkCoord::new(
            super::core::voxel_space_to_chunk_component(xs, CHUNK_EDGE),
            super::core::voxel_space_to_chunk_component(ys, CHUNK_EDGE),
            super::core::voxel_space_to_chunk_component(zs, CHUNK_EDGE),
        );
        let voxel = VoxelCoord::new(
            super::core::voxel_space_to_local_component(xs, CHUNK_EDGE),
            super::core::voxel_space_to_local_component(ys, CHUNK_EDGE),
            super::core::voxel_space_to_local_component(zs, CHUNK_EDGE),
        );
        (chunk, voxel)
    }

    /// Write a single voxel, queuing its chunk (and, per the axis-positive
    /// neighbor rule, any neighbor whose shared-face cells sample across
    /// into it) for mesh rebuild.
    pub fn write_voxel(&mut self, coord: ChunkCoord, voxel: VoxelCoord, value: Density) -> NetResult<()> {
        if voxel.x >= CHUNK_EDGE || voxel.y >= CHUNK_EDGE || voxel.z >= CHUNK_EDGE {
            return Err(NetError::VoxelOutOfBounds {
                x: voxel.x as i32,
                y: voxel.y as i32,
                z: voxel.z as i32,
                chunk_edge: CHUNK_EDGE,
            });
        }

        let record_history = self.is_server;
        let index = pack_chunk_coord(coord, self.grid_edge)?;
        let chunk = self.slots[index]
            .as_mut()
            .ok_or(NetError::ChunkNotLoaded((coord.x, coord.y, coord.z)))?;
        chunk_ops::set_density(chunk, voxel, value, record_history);

        if record_history {
            self.note_modified_chunk(index);
        }

        self.queue_rebuild(coord);
        // A write near the min corner of this chunk invalidates the
        // negative-axis-neighbor's mesh too, since marching cubes samples
        // one cell past each chunk's far face. Queue every axis-negative
        // neighbor (i.e. every chunk whose *positive* face borders this
        // voxel) unconditionally; spec.md's requirement is phrased from the
        // neighbor's point of view ("rebuilds for one chunk MUST also
        // occur when any of its axis-positive neighbors becomes dirty").
        for (dx, dy, dz) in [(-1, 0, 0), (0, -1, 0), (0, 0, -1)] {
            let neighbor = ChunkCoord::new(coord.x + dx, coord.y + dy, coord.z + dz);
            if neighbor.in_bounds(self.grid_edge) && self.is_loaded(neighbor) {
                self.queue_rebuild(neighbor);
            }
        }

        Ok(())
    }

    fn queue_rebuild(&mut self, coord: ChunkCoord) {
        let Ok(index) = pack_chunk_coord(coord, self.grid_edge) else {
            return;
        };
        if let Some(chunk) = self.slots[index].as_mut() {
            if chunk_ops::mark_queued_for_rebuild(chunk) {
                self.rebuild_queue.push_back(index);
            }
        }
    }

    fn note_modified_chunk(&mut self, index: usize) {
        if self.modified_chunks.contains(&index) {
            return;
        }
        if self.modified_chunks.len() >= MAX_MODIFIED_CHUNKS {
            return;
        }
        self.modified_chunks.push(index);
    }

    /// Drain the rebuild queue, regenerating the mesh of every chunk in it.
    pub fn process_rebuild_queue(&mut self) {
        while let Some(index) = self.rebuild_queue.pop_front() {
            let coord = unpack_chunk_coord(index, self.grid_edge);
            if self.slots[index].is_none() {
                continue;
            }
            let vertices = mesh::rebuild_chunk_mesh(self, coord);
            if let Some(chunk) = self.slots[index].as_mut() {
                chunk_ops::apply_rebuilt_mesh(chunk, vertices);
            }
        }
    }

    /// Every currently loaded chunk's full density buffer, for the
    /// CHUNK_VOXELS_HARD_UPDATE burst a newly joined client needs before it
    /// has anything to diff against (spec.md §4.2/§6).
    pub fn all_loaded_chunks(&self) -> Vec<(ChunkCoord, Box<[Density; crate::constants::VOXELS_PER_CHUNK]>)> {
        let mut out = Vec::new();
        for index in 0..self.slots.len() {
            if let Some(chunk) = self.slots[index].as_ref() {
                out.push((unpack_chunk_coord(index, self.grid_edge), chunk.densities.clone()));
            }
        }
        out
    }

    /// World-space position of an integer global voxel-space coordinate
    /// (i.e. not relative to any one chunk). Used by the collision resolver,
    /// which enumerates lattice cells directly in world space rather than
    /// per-chunk.
    pub fn global_voxel_world_position(&self, gx: i32, gy: i32, gz: i32) -> Point3<f32> {
        let base = world_origin(self.grid_edge, CHUNK_EDGE, self.voxel_size);
        Point3::new(
            base + gx as f32 * self.voxel_size,
            base + gy as f32 * self.voxel_size,
            base + gz as f32 * self.voxel_size,
        )
    }

    /// Density at an integer global voxel-space coordinate, or `None` if its
    /// chunk isn't loaded.
    pub fn density_at_global(&self, gx: i32, gy: i32, gz: i32) -> Option<Density> {
        let chunk_edge = CHUNK_EDGE as i32;
        let chunk = ChunkCoord::new(
            gx.div_euclid(chunk_edge),
            gy.div_euclid(chunk_edge),
            gz.div_euclid(chunk_edge),
        );
        let voxel = VoxelCoord::new(
            gx.rem_euclid(chunk_edge) as u32,
            gy.rem_euclid(chunk_edge) as u32,
            gz.rem_euclid(chunk_edge) as u32,
        );
        let data = self.chunk(chunk)?;
        Some(data.density(voxel.x, voxel.y, voxel.z))
    }

    /// Map a world-space scalar to its nearest integer global voxel-space
    /// coordinate along one axis.
    pub fn world_to_global_voxel_component(&self, world: f32) -> i32 {
        super::core::world_to_voxel_space(world, self.grid_edge, CHUNK_EDGE, self.voxel_size).round() as i32
    }

    /// Server only: drain the modified-chunk set into a sparse per-voxel
    /// edit list (index, current density) per touched chunk, for the
    /// snapshot dispatcher's per-client voxel-correction block
    /// (spec.md §4.3/§4.7). Unlike [`Self::all_loaded_chunks`], which hands
    /// back every chunk's full density buffer for a newly joined client's
    /// hard sync, this only reports the voxels actually written this tick.
    pub fn drain_touched_voxel_edits(&mut self) -> Vec<(ChunkCoord, Vec<(u16, Density)>)> {
        let indices = std::mem::take(&mut self.modified_chunks);
        let mut out = Vec::with_capacity(indices.len());
        for index in indices {
            if let Some(chunk) = self.slots[index].as_mut() {
                let touched = chunk
                    .history
                    .as_ref()
                    .map(|history| history.touched_indices.clone())
                    .unwrap_or_default();
                let edits = touched.into_iter().map(|linear| (linear, chunk.densities[linear as usize])).collect();
                out.push((unpack_chunk_coord(index, self.grid_edge), edits));
                chunk_ops::clear_history(chunk);
            }
        }
        out
    }

    /// Server only: the per-voxel value recorded *before* this tick's
    /// writes, for the snapshot voxel-correction comparison (spec.md §4.3).
    /// Falls back to the current density if no write touched this chunk
    /// this tick (nothing to compare against, server and client already agree).
    pub fn pre_tick_density(&self, coord: ChunkCoord, voxel: VoxelCoord) -> Option<Density> {
        let chunk = self.chunk(coord)?;
        match &chunk.history {
            Some(history) => Some(history.pre_tick_densities[voxel.linear_index(CHUNK_EDGE)]),
            None => Some(chunk_ops::get_density(chunk, voxel)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(3, 9.0, 60, true);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    grid.load_empty(ChunkCoord::new(x, y, z)).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn write_voxel_queues_rebuild_and_neighbor() {
        let mut grid = make_grid();
        grid.load_empty(ChunkCoord::new(0, 1, 1)).unwrap();
        grid.write_voxel(ChunkCoord::new(1, 1, 1), VoxelCoord::new(0, 5, 5), Density(80))
            .unwrap();
        assert!(grid.chunk(ChunkCoord::new(1, 1, 1)).unwrap().queued_for_rebuild);
        assert!(grid.chunk(ChunkCoord::new(0, 1, 1)).unwrap().queued_for_rebuild);
    }

    #[test]
    fn out_of_bounds_voxel_is_rejected() {
        let mut grid = make_grid();
        let err = grid.write_voxel(ChunkCoord::new(1, 1, 1), VoxelCoord::new(16, 0, 0), Density(1));
        assert!(err.is_err());
    }

    #[test]
    fn modified_chunk_set_is_bounded_and_drains() {
        let mut grid = ChunkGrid::new(6, 9.0, 60, true);
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    grid.load_empty(ChunkCoord::new(x, y, z)).unwrap();
                }
            }
        }
        for z in 0..6 {
            for y in 0..6 {
                for x in 0..6 {
                    grid.write_voxel(ChunkCoord::new(x, y, z), VoxelCoord::new(0, 0, 0), Density(70))
                        .unwrap();
                }
            }
        }
        let drained = grid.drain_touched_voxel_edits();
        assert_eq!(drained.len(), MAX_MODIFIED_CHUNKS);
        assert!(grid.drain_touched_voxel_edits().is_empty());
    }

    #[test]
    fn all_loaded_chunks_enumerates_every_populated_slot() {
        let grid = make_grid();
        assert_eq!(grid.all_loaded_chunks().len(), 27);
    }

    #[test]
    fn touched_voxel_edits_are_sparse() {
        let mut grid = make_grid();
        grid.write_voxel(ChunkCoord::new(1, 1, 1), VoxelCoord::new(2, 2, 2), Density(90)).unwrap();
        let touched = grid.drain_touched_voxel_edits();
        assert_eq!(touched.len(), 1);
        let (coord, edits) = &touched[0];
        assert_eq!(*coord, ChunkCoord::new(1, 1, 1));
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1, Density(90));
        assert!(grid.drain_touched_voxel_edits().is_empty());
    }
}
