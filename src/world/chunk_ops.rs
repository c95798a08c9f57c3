//! Pure functions that transform [`ChunkData`]. No methods, no `self`.

use super::chunk::{ChunkData, ChunkHistory};
use super::core::voxel::Density;
use super::core::VoxelCoord;
use crate::constants::CHUNK_EDGE;

/// Read a voxel's density. Out-of-range coordinates never happen in
/// practice (callers are expected to bounds-check against `CHUNK_EDGE`
/// before calling) but this still indexes safely via the same linear
/// mapping used everywhere else.
pub fn get_density(chunk: &ChunkData, coord: VoxelCoord) -> Density {
    chunk.densities[coord.linear_index(CHUNK_EDGE)]
}

/// Write a voxel's density, marking the chunk modified and dirty for
/// mesh rebuild. If `record_history` is set (server only) and this is
/// the first write since the last snapshot, the pre-write grid is
/// snapshotted first, per spec.md §4.2.
pub fn set_density(chunk: &mut ChunkData, coord: VoxelCoord, value: Density, record_history: bool) {
    let index = coord.linear_index(CHUNK_EDGE);

    if record_history {
        ensure_history(chunk);
        record_touch(chunk, index as u16);
    }

    chunk.densities[index] = value;
    chunk.modified = true;
    chunk.mesh_dirty = true;
}

/// Start (or continue) the server-only pre-tick history for this chunk.
fn ensure_history(chunk: &mut ChunkData) {
    if chunk.history.is_none() {
        chunk.history = Some(ChunkHistory::new(&chunk.densities));
    }
}

/// Record that `index` was touched this tick, deduplicating and capping
/// at `VOXELS_PER_CHUNK / 4` entries as spec.md §3 requires. Overflow
/// silently discards the duplicate (the pre-tick density is still correct
/// for every already-recorded index; entries beyond the cap simply aren't
/// individually reported, matching the invariant's "discards duplicates
/// by index" wording).
fn record_touch(chunk: &mut ChunkData, index: u16) {
    let Some(history) = chunk.history.as_mut() else {
        return;
    };
    if history.touched_indices.contains(&index) {
        return;
    }
    if history.touched_indices.len() >= crate::constants::max_modified_voxels_per_chunk() {
        return;
    }
    history.touched_indices.push(index);
}

/// Clear the server-only history, called once a snapshot referencing it
/// has been fully emitted.
pub fn clear_history(chunk: &mut ChunkData) {
    chunk.history = None;
}

/// Mark a chunk queued for mesh rebuild, returning `true` if it wasn't
/// already queued (the caller uses this to avoid double-pushing it onto a
/// rebuild work-list).
pub fn mark_queued_for_rebuild(chunk: &mut ChunkData) -> bool {
    if chunk.queued_for_rebuild {
        false
    } else {
        chunk.queued_for_rebuild = true;
        true
    }
}

/// Install freshly-built vertices and clear the dirty/queued flags.
pub fn apply_rebuilt_mesh(chunk: &mut ChunkData, vertices: Vec<cgmath::Point3<f32>>) {
    chunk.vertices = vertices;
    chunk.mesh_dirty = false;
    chunk.queued_for_rebuild = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn set_density_marks_dirty_and_modified() {
        let mut chunk = ChunkData::empty(Point3::new(0.0, 0.0, 0.0));
        assert!(!chunk.modified);
        set_density(&mut chunk, VoxelCoord::new(1, 1, 1), Density(80), false);
        assert!(chunk.modified);
        assert!(chunk.mesh_dirty);
        assert_eq!(get_density(&chunk, VoxelCoord::new(1, 1, 1)), Density(80));
    }

    #[test]
    fn history_captures_pre_write_value_once() {
        let mut chunk = ChunkData::empty(Point3::new(0.0, 0.0, 0.0));
        set_density(&mut chunk, VoxelCoord::new(0, 0, 0), Density(10), true);
        set_density(&mut chunk, VoxelCoord::new(0, 0, 0), Density(20), true);
        let history = chunk.history.as_ref().unwrap();
        assert_eq!(history.pre_tick_densities[0], Density::EMPTY);
        assert_eq!(history.touched_indices, vec![0]);
    }

    #[test]
    fn history_caps_touched_indices() {
        let mut chunk = ChunkData::empty(Point3::new(0.0, 0.0, 0.0));
        let cap = crate::constants::max_modified_voxels_per_chunk();
        for i in 0..cap + 10 {
            let coord = VoxelCoord::from_linear_index(i, CHUNK_EDGE);
            set_density(&mut chunk, coord, Density(99), true);
        }
        assert_eq!(chunk.history.unwrap().touched_indices.len(), cap);
    }

    #[test]
    fn mark_queued_is_idempotent() {
        let mut chunk = ChunkData::empty(Point3::new(0.0, 0.0, 0.0));
        assert!(mark_queued_for_rebuild(&mut chunk));
        assert!(!mark_queued_for_rebuild(&mut chunk));
    }
}
