//! Server-side snapshot dispatcher (C8), per spec.md §4.7.
//!
//! Assembles one GAME_STATE_SNAPSHOT per connected client — never a
//! broadcast, since the voxel-correction overlay and `need_correction`
//! flag are per-recipient.

use super::anticheat::{direction_diverges, position_diverges, voxel_wire_value};
use super::server_state::ServerState;
use crate::codec::{ChunkVoxelEdits, Packet, RemotePlayerBlock, VoxelEdit};
use crate::constants::{DEFAULT_EPSILON_DIRECTION, DEFAULT_EPSILON_POSITION};
use crate::entities::PlayerData;
use crate::world::core::unpack_chunk_coord;
use crate::world::ChunkGrid;
use rustc_hash::FxHashMap;

/// Densities touched this tick, already flattened out of the grid once
/// per tick (not per recipient) by [`crate::world::ChunkGrid::drain_touched_voxel_edits`].
pub type TickVoxelDeltas = Vec<(crate::world::core::ChunkCoord, Vec<(u16, crate::world::Density)>)>;

/// Build one client's snapshot. `players` holds every connected player's
/// server-authoritative state, keyed by `client_id`, including the
/// recipient's own (sent back as one of the `remote_players` blocks).
pub fn build_snapshot(
    server: &ServerState,
    grid_edge: u32,
    recipient_id: u32,
    current_tick: u64,
    previous_client_tick: u64,
    grid: &ChunkGrid,
    players: &FxHashMap<u32, PlayerData>,
) -> Packet {
    let recipient = server.clients.get(&recipient_id);

    let voxel_corrections = build_voxel_corrections(grid_edge, recipient, grid);

    let mut remote_players = Vec::with_capacity(players.len());
    for (&client_id, player) in players {
        let need_correction = client_id == recipient_id
            && recipient
                .map(|c| {
                    position_diverges(c.claimed_position, player.position, DEFAULT_EPSILON_POSITION)
                        || direction_diverges(c.claimed_direction, player.direction, DEFAULT_EPSILON_DIRECTION)
                })
                .unwrap_or(false);
        let need_voxel_correction = client_id == recipient_id && voxel_corrections.iter().any(|chunk| {
            chunk.voxels.iter().any(|v| v.value != crate::constants::VOXEL_SENTINEL)
        });

        if need_correction || need_voxel_correction {
            tracing::debug!(client_id, need_correction, need_voxel_correction, "snapshot carries correction for client");
        }

        remote_players.push(RemotePlayerBlock {
            client_id: client_id as u16,
            position: player.position,
            direction: player.direction,
            velocity: player.velocity,
            up: player.up,
            quaternion: [player.orientation.v.x, player.orientation.v.y, player.orientation.v.z, player.orientation.s],
            action_flags: player.action_mask,
            need_correction,
            need_voxel_correction,
            ignore: false,
            rolling: player.rolling,
        });
    }

    Packet::GameStateSnapshot {
        current_tick,
        client_id: recipient_id,
        previous_client_tick,
        voxel_corrections,
        remote_players,
    }
}

/// Annotate the recipient's own previously claimed voxel edits with either
/// the sentinel (the claim matched the server's current density) or the
/// server's authoritative value, per spec.md §4.3/§4.7. The source of the
/// list is the client's claims, not this tick's server-side writes — a
/// claimed voxel the server never touched this tick must still be checked.
fn build_voxel_corrections(grid_edge: u32, recipient: Option<&super::server_state::ClientConnection>, grid: &ChunkGrid) -> Vec<ChunkVoxelEdits> {
    let Some(recipient) = recipient else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(recipient.claimed_voxel_edits.len());
    for chunk_edit in &recipient.claimed_voxel_edits {
        let coord = unpack_chunk_coord(chunk_edit.chunk_linear_index as usize, grid_edge);

        let mut voxels = Vec::with_capacity(chunk_edit.voxels.len());
        for claim in &chunk_edit.voxels {
            let claimed_density = crate::world::Density(claim.value);
            let authoritative = grid
                .chunk(coord)
                .map(|chunk| chunk.density(claim.x as u32, claim.y as u32, claim.z as u32))
                .unwrap_or(claimed_density);

            let wire_value = voxel_wire_value(claimed_density, authoritative);
            voxels.push(VoxelEdit { x: claim.x, y: claim.y, z: claim.z, value: wire_value.0 });
        }

        out.push(ChunkVoxelEdits { chunk_linear_index: chunk_edit.chunk_linear_index, voxels });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NetworkRole;
    use crate::world::core::ChunkCoord;
    use cgmath::{Point3, Vector3};
    use std::net::SocketAddr;

    #[test]
    fn snapshot_carries_sentinel_when_claim_matches_server() {
        let mut server = ServerState::new();
        let addr: SocketAddr = "127.0.0.1:6001".parse().unwrap();
        let id = server.connect(addr, Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        server.clients.get_mut(&id).unwrap().claimed_voxel_edits = vec![ChunkVoxelEdits {
            chunk_linear_index: 0,
            voxels: vec![VoxelEdit { x: 1, y: 1, z: 1, value: 80 }],
        }];

        let mut grid = ChunkGrid::new(5, 9.0, 60, true);
        grid.load_empty(ChunkCoord::new(0, 0, 0)).unwrap();
        grid.write_voxel(ChunkCoord::new(0, 0, 0), crate::world::core::VoxelCoord::new(1, 1, 1), crate::world::Density(80)).unwrap();

        let mut players = FxHashMap::default();
        players.insert(
            id,
            PlayerData::new(id, "p1".to_string(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), NetworkRole::ServerAuthoritative),
        );

        let packet = build_snapshot(&server, 5, id, 10, 9, &grid, &players);
        match packet {
            Packet::GameStateSnapshot { voxel_corrections, .. } => {
                assert_eq!(voxel_corrections[0].voxels[0].value, crate::constants::VOXEL_SENTINEL);
            }
            _ => panic!("wrong variant"),
        }
    }

    /// A voxel the client claimed in a prior tick, but that the server did
    /// not happen to write this tick, must still be checked against the
    /// grid's current density and corrected if the claim was wrong.
    #[test]
    fn snapshot_corrects_claim_the_server_never_touched_this_tick() {
        let mut server = ServerState::new();
        let addr: SocketAddr = "127.0.0.1:6002".parse().unwrap();
        let id = server.connect(addr, Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        server.clients.get_mut(&id).unwrap().claimed_voxel_edits = vec![ChunkVoxelEdits {
            chunk_linear_index: 0,
            voxels: vec![VoxelEdit { x: 2, y: 2, z: 2, value: 120 }],
        }];

        let mut grid = ChunkGrid::new(5, 9.0, 60, true);
        grid.load_empty(ChunkCoord::new(0, 0, 0)).unwrap();

        let players = FxHashMap::default();
        let packet = build_snapshot(&server, 5, id, 10, 9, &grid, &players);
        match packet {
            Packet::GameStateSnapshot { voxel_corrections, .. } => {
                assert_eq!(voxel_corrections[0].voxels[0].value, crate::world::Density::EMPTY.0);
                assert_ne!(voxel_corrections[0].voxels[0].value, crate::constants::VOXEL_SENTINEL);
            }
            _ => panic!("wrong variant"),
        }
    }
}
