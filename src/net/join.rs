//! Server-side JOIN handling (scenario 1): allocate a client id, answer with
//! HANDSHAKE, hand the new client the current terrain as a
//! CHUNK_VOXELS_HARD_UPDATE burst, and announce the new player to everyone
//! already connected via CLIENT_JOINED.

use super::server_state::ServerState;
use crate::codec::{Packet, PlayerInit};
use crate::constants::chunks_per_hard_sync_packet;
use crate::entities::{NetworkRole, PlayerData};
use crate::world::ChunkGrid;
use cgmath::{Point3, Vector3};
use rustc_hash::FxHashMap;
use std::net::SocketAddr;

fn player_init(player: &PlayerData, avatar_color: u8) -> PlayerInit {
    PlayerInit { client_id: player.client_id, name: player.name.clone(), position: player.position, direction: player.direction, avatar_color }
}

/// Cosmetic avatar tint, server-assigned from the client id (SPEC_FULL.md §3.1).
fn assign_avatar_color(client_id: u32) -> u8 {
    client_id as u8
}

/// Split every loaded chunk into one or more CHUNK_VOXELS_HARD_UPDATE
/// packets bounded by [`chunks_per_hard_sync_packet`], per spec.md §6's
/// `is_first_in_burst`/`total_chunks_in_burst` framing.
fn build_hard_sync_burst(grid: &ChunkGrid, current_tick: u64, client_id: u32) -> Vec<Packet> {
    let all = grid.all_loaded_chunks();
    let total = all.len() as u32;
    let per_packet = chunks_per_hard_sync_packet().max(1);

    all.chunks(per_packet)
        .enumerate()
        .map(|(i, batch)| Packet::ChunkVoxelsHardUpdate {
            current_tick,
            client_id,
            is_first_in_burst: i == 0,
            total_chunks_in_burst: total,
            chunks: batch.iter().map(|(coord, densities)| (coord.x as u8, coord.y as u8, coord.z as u8, densities.clone())).collect(),
        })
        .collect()
}

/// Handle one JOIN: registers the connection and player, and returns the
/// HANDSHAKE + hard-sync burst addressed to the joining client plus the
/// CLIENT_JOINED announcement for everyone already connected.
pub fn handle_join(
    server: &mut ServerState,
    players: &mut FxHashMap<u32, PlayerData>,
    grid: &ChunkGrid,
    addr: SocketAddr,
    name: String,
    spawn_position: Point3<f32>,
    spawn_direction: Vector3<f32>,
    current_tick: u64,
) -> (Packet, Vec<Packet>, Option<Packet>) {
    let client_id = server.connect(addr, spawn_position, spawn_direction);
    tracing::info!(client_id, %addr, %name, "client joined");
    let avatar_color = assign_avatar_color(client_id);
    let player = PlayerData::new(client_id, name, spawn_position, spawn_direction, NetworkRole::ServerAuthoritative);
    let new_player_init = player_init(&player, avatar_color);

    let announcement = if players.is_empty() {
        None
    } else {
        Some(Packet::ClientJoined { current_tick, client_id, player: new_player_init.clone() })
    };

    let mut existing: Vec<PlayerInit> = players.values().map(|p| player_init(p, assign_avatar_color(p.client_id))).collect();
    existing.push(new_player_init);
    players.insert(client_id, player);

    let handshake = Packet::Handshake {
        current_tick,
        client_id,
        grid_edge_size: grid.grid_edge,
        voxel_size: grid.voxel_size,
        chunk_count: grid.all_loaded_chunks().len() as u32,
        max_chunks: grid.grid_edge * grid.grid_edge * grid.grid_edge,
        assigned_client_index: client_id,
        players: existing,
    };

    let burst = build_hard_sync_burst(grid, current_tick, client_id);
    (handshake, burst, announcement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ChunkCoord;

    fn make_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(2, 9.0, 60, true);
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
    fn first_join_gets_no_announcement_and_full_hard_sync() {
        let mut server = ServerState::new();
        let mut players = FxHashMap::default();
        let grid = make_grid();
        let addr: SocketAddr = "127.0.0.1:6001".parse().unwrap();

        let (handshake, burst, announcement) =
            handle_join(&mut server, &mut players, &grid, addr, "p1".to_string(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 0);

        assert!(announcement.is_none());
        assert_eq!(players.len(), 1);
        let total_chunks: usize = burst
            .iter()
            .map(|p| match p {
                Packet::ChunkVoxelsHardUpdate { chunks, .. } => chunks.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(total_chunks, 8);

        match handshake {
            Packet::Handshake { grid_edge_size, assigned_client_index, players, .. } => {
                assert_eq!(grid_edge_size, 2);
                assert_eq!(assigned_client_index, 0);
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].name, "p1");
            }
            _ => panic!("expected handshake"),
        }
    }

    #[test]
    fn second_join_announces_to_existing_players() {
        let mut server = ServerState::new();
        let mut players = FxHashMap::default();
        let grid = make_grid();
        let addr: SocketAddr = "127.0.0.1:6001".parse().unwrap();

        handle_join(&mut server, &mut players, &grid, addr, "p1".to_string(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 0);
        let (handshake, _, announcement) =
            handle_join(&mut server, &mut players, &grid, addr, "p2".to_string(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 0);

        assert!(announcement.is_some());
        match handshake {
            Packet::Handshake { players, .. } => assert_eq!(players.len(), 2),
            _ => panic!("expected handshake"),
        }
    }
}
