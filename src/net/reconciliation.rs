//! Client-side reconciliation (C9), per spec.md §4.3's "client
//! reconciliation" step.

use crate::codec::{ChunkVoxelEdits, RemotePlayerBlock};
use crate::entities::PlayerData;
use crate::world::core::{unpack_chunk_coord, ChunkCoord, VoxelCoord};
use crate::world::{ChunkGrid, Density};

/// Outcome of applying one snapshot's own-player slot to the local player.
pub enum Reconciliation {
    /// `ignore` was set; the snapshot carried nothing actionable.
    Ignored,
    /// No correction was needed; local prediction stood.
    Accepted,
    /// The server overrode local state. Carries the tick the client must
    /// stamp its PREDICTION_ERROR_CORRECTION ack with, and the client's
    /// local tick must be snapped to the same value.
    Corrected { acknowledged_tick: u64 },
}

/// Apply one GAME_STATE_SNAPSHOT's own-player block and voxel-correction
/// block to the local player and grid, per spec.md §4.3.
pub fn reconcile(
    player: &mut PlayerData,
    grid_edge: u32,
    grid: &mut ChunkGrid,
    own_block: &RemotePlayerBlock,
    voxel_corrections: &[ChunkVoxelEdits],
    previous_client_tick: u64,
) -> Reconciliation {
    if own_block.ignore {
        return Reconciliation::Ignored;
    }

    if !own_block.need_correction && !own_block.need_voxel_correction {
        return Reconciliation::Accepted;
    }

    tracing::debug!(client_id = player.client_id, previous_client_tick, voxel_correction = own_block.need_voxel_correction, "applying server correction");

    if own_block.need_correction {
        player.position = own_block.position;
        player.direction = own_block.direction;
        player.velocity = own_block.velocity;
        player.up = own_block.up;
    }

    if own_block.need_voxel_correction {
        apply_voxel_corrections(grid, grid_edge, voxel_corrections);
    }

    Reconciliation::Corrected { acknowledged_tick: previous_client_tick }
}

fn apply_voxel_corrections(grid: &mut ChunkGrid, grid_edge: u32, corrections: &[ChunkVoxelEdits]) {
    for chunk_edit in corrections {
        let coord = unpack_chunk_coord(chunk_edit.chunk_linear_index as usize, grid_edge);
        for edit in &chunk_edit.voxels {
            if Density(edit.value) == Density::SENTINEL {
                continue;
            }
            let voxel = VoxelCoord::new(edit.x as u32, edit.y as u32, edit.z as u32);
            let _ = grid.write_voxel(coord, voxel, Density(edit.value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NetworkRole;
    use cgmath::{Point3, Vector3};

    fn make_player() -> PlayerData {
        PlayerData::new(0, "p1".to_string(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), NetworkRole::LocalAuthoritativePrediction)
    }

    fn make_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(2, 9.0, 60, false);
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    grid.load_empty(ChunkCoord::new(x, y, z)).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn ignore_flag_short_circuits() {
        let mut player = make_player();
        let mut grid = make_grid();
        let block = RemotePlayerBlock {
            client_id: 0,
            position: Point3::new(9.0, 9.0, 9.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            quaternion: [0.0, 0.0, 0.0, 1.0],
            action_flags: 0,
            need_correction: true,
            need_voxel_correction: false,
            ignore: true,
            rolling: false,
        };
        let outcome = reconcile(&mut player, 2, &mut grid, &block, &[], 5);
        assert!(matches!(outcome, Reconciliation::Ignored));
        assert_eq!(player.position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn correction_overwrites_local_state_and_acks_previous_tick() {
        let mut player = make_player();
        let mut grid = make_grid();
        let block = RemotePlayerBlock {
            client_id: 0,
            position: Point3::new(3.0, 4.0, 5.0),
            direction: Vector3::new(1.0, 0.0, 0.0),
            velocity: Vector3::new(0.0, -1.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            quaternion: [0.0, 0.0, 0.0, 1.0],
            action_flags: 0,
            need_correction: true,
            need_voxel_correction: false,
            ignore: false,
            rolling: false,
        };
        let outcome = reconcile(&mut player, 2, &mut grid, &block, &[], 7);
        assert!(matches!(outcome, Reconciliation::Corrected { acknowledged_tick: 7 }));
        assert_eq!(player.position, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn voxel_divergence_overwrites_local_density_and_acks_previous_tick() {
        let mut player = make_player();
        let mut grid = make_grid();
        grid.write_voxel(ChunkCoord::new(1, 1, 1), VoxelCoord::new(1, 1, 1), Density(120)).unwrap();

        let block = RemotePlayerBlock {
            client_id: 0,
            position: player.position,
            direction: player.direction,
            velocity: player.velocity,
            up: player.up,
            quaternion: [0.0, 0.0, 0.0, 1.0],
            action_flags: 0,
            need_correction: false,
            need_voxel_correction: true,
            ignore: false,
            rolling: false,
        };
        let chunk_linear_index = crate::world::core::pack_chunk_coord(ChunkCoord::new(1, 1, 1), 2).unwrap() as u16;
        let corrections = vec![ChunkVoxelEdits { chunk_linear_index, voxels: vec![crate::codec::VoxelEdit { x: 1, y: 1, z: 1, value: 80 }] }];

        let outcome = reconcile(&mut player, 2, &mut grid, &block, &corrections, 9);
        assert!(matches!(outcome, Reconciliation::Corrected { acknowledged_tick: 9 }));
        assert_eq!(grid.chunk(ChunkCoord::new(1, 1, 1)).unwrap().density(1, 1, 1), Density(80));
    }
}
