//! Tagged-variant packet set (C1), per spec.md §6 plus the supplemented
//! `avatar_color` field (SPEC_FULL.md §3.1). One sum type discriminated by
//! the envelope's 4-bit type field, dispatched on by tag rather than by
//! inheritance (spec.md §9).

use super::cursor::{ReadCursor, WriteCursor};
use super::envelope::{Envelope, PacketType, ENVELOPE_SIZE};
use crate::constants::VOXELS_PER_CHUNK;
use crate::error::{NetError, NetResult};
use crate::world::Density;
use cgmath::{EuclideanSpace, Point3, Vector3};

/// One player's identity + pose, shared by HANDSHAKE and CLIENT_JOINED.
#[derive(Debug, Clone)]
pub struct PlayerInit {
    pub client_id: u32,
    pub name: String,
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    /// Cosmetic avatar tint, server-assigned (SPEC_FULL.md §3.1).
    pub avatar_color: u8,
}

/// One voxel write claimed by a client (INPUT_STATE) or confirmed/corrected
/// by the server (GAME_STATE_SNAPSHOT) — same wire shape both directions.
#[derive(Debug, Clone)]
pub struct VoxelEdit {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub value: u8,
}

#[derive(Debug, Clone)]
pub struct ChunkVoxelEdits {
    pub chunk_linear_index: u16,
    pub voxels: Vec<VoxelEdit>,
}

#[derive(Debug, Clone)]
pub struct CommandSample {
    pub action_flags: u32,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub flags_byte: u8,
    pub dt: f32,
}

#[derive(Debug, Clone)]
pub struct RemotePlayerBlock {
    pub client_id: u16,
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub up: Vector3<f32>,
    pub quaternion: [f32; 4],
    pub action_flags: u32,
    pub need_correction: bool,
    pub need_voxel_correction: bool,
    pub ignore: bool,
    pub rolling: bool,
}

impl RemotePlayerBlock {
    fn flags_byte(&self) -> u8 {
        (self.need_correction as u8)
            | (self.need_voxel_correction as u8) << 1
            | (self.ignore as u8) << 2
            | (self.rolling as u8) << 3
    }

    fn from_flags_byte(byte: u8) -> (bool, bool, bool, bool) {
        (byte & 1 != 0, byte & 2 != 0, byte & 4 != 0, byte & 8 != 0)
    }
}

#[derive(Debug, Clone)]
pub enum Packet {
    Join {
        current_tick: u64,
        client_id: u32,
        name: String,
    },
    InputState {
        current_tick: u64,
        client_id: u32,
        samples: Vec<CommandSample>,
        predicted_position: Point3<f32>,
        predicted_direction: Vector3<f32>,
        voxel_edits: Vec<ChunkVoxelEdits>,
    },
    AckSnapshot {
        current_tick: u64,
        client_id: u32,
        game_state_tick: u64,
    },
    PredictionErrorCorrection {
        current_tick: u64,
        client_id: u32,
        acknowledged_tick: u64,
    },
    Handshake {
        current_tick: u64,
        client_id: u32,
        grid_edge_size: u32,
        voxel_size: f32,
        chunk_count: u32,
        max_chunks: u32,
        assigned_client_index: u32,
        players: Vec<PlayerInit>,
    },
    ChunkVoxelsHardUpdate {
        current_tick: u64,
        client_id: u32,
        is_first_in_burst: bool,
        total_chunks_in_burst: u32,
        chunks: Vec<(u8, u8, u8, Box<[Density; VOXELS_PER_CHUNK]>)>,
    },
    GameStateSnapshot {
        current_tick: u64,
        client_id: u32,
        previous_client_tick: u64,
        voxel_corrections: Vec<ChunkVoxelEdits>,
        remote_players: Vec<RemotePlayerBlock>,
    },
    ClientJoined {
        current_tick: u64,
        client_id: u32,
        player: PlayerInit,
    },
}

fn write_player_init(w: &mut WriteCursor, player: &PlayerInit) {
    w.write_u32(player.client_id);
    w.write_str(&player.name);
    w.write_vec3(player.position.to_vec());
    w.write_vec3(player.direction);
    w.write_u8(player.avatar_color);
}

fn read_player_init(r: &mut ReadCursor) -> NetResult<PlayerInit> {
    let client_id = r.read_u32()?;
    let name = r.read_str()?;
    let position = Point3::from_vec(r.read_vec3()?);
    let direction = r.read_vec3()?;
    let avatar_color = r.read_u8()?;
    Ok(PlayerInit { client_id, name, position, direction, avatar_color })
}

fn write_voxel_edit_block(w: &mut WriteCursor, chunks: &[ChunkVoxelEdits]) {
    w.write_u32(chunks.len() as u32);
    for chunk in chunks {
        w.write_u16(chunk.chunk_linear_index);
        w.write_u32(chunk.voxels.len() as u32);
        for edit in &chunk.voxels {
            w.write_u8(edit.x);
            w.write_u8(edit.y);
            w.write_u8(edit.z);
            w.write_u8(edit.value);
        }
    }
}

fn read_voxel_edit_block(r: &mut ReadCursor) -> NetResult<Vec<ChunkVoxelEdits>> {
    let chunk_count = r.read_u32()?;
    let mut chunks = Vec::with_capacity(chunk_count as usize);
    for _ in 0..chunk_count {
        let chunk_linear_index = r.read_u16()?;
        let voxel_count = r.read_u32()?;
        let mut voxels = Vec::with_capacity(voxel_count as usize);
        for _ in 0..voxel_count {
            voxels.push(VoxelEdit {
                x: r.read_u8()?,
                y: r.read_u8()?,
                z: r.read_u8()?,
                value: r.read_u8()?,
            });
        }
        chunks.push(ChunkVoxelEdits { chunk_linear_index, voxels });
    }
    Ok(chunks)
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Join { .. } => PacketType::Join,
            Packet::InputState { .. } => PacketType::InputState,
            Packet::AckSnapshot { .. } => PacketType::AckSnapshot,
            Packet::PredictionErrorCorrection { .. } => PacketType::PredictionErrorCorrection,
            Packet::Handshake { .. } => PacketType::Handshake,
            Packet::ChunkVoxelsHardUpdate { .. } => PacketType::ChunkVoxelsHardUpdate,
            Packet::GameStateSnapshot { .. } => PacketType::GameStateSnapshot,
            Packet::ClientJoined { .. } => PacketType::ClientJoined,
        }
    }

    fn current_tick(&self) -> u64 {
        match self {
            Packet::Join { current_tick, .. }
            | Packet::InputState { current_tick, .. }
            | Packet::AckSnapshot { current_tick, .. }
            | Packet::PredictionErrorCorrection { current_tick, .. }
            | Packet::Handshake { current_tick, .. }
            | Packet::ChunkVoxelsHardUpdate { current_tick, .. }
            | Packet::GameStateSnapshot { current_tick, .. }
            | Packet::ClientJoined { current_tick, .. } => *current_tick,
        }
    }

    fn client_id(&self) -> u32 {
        match self {
            Packet::Join { client_id, .. }
            | Packet::InputState { client_id, .. }
            | Packet::AckSnapshot { client_id, .. }
            | Packet::PredictionErrorCorrection { client_id, .. }
            | Packet::Handshake { client_id, .. }
            | Packet::ChunkVoxelsHardUpdate { client_id, .. }
            | Packet::GameStateSnapshot { client_id, .. }
            | Packet::ClientJoined { client_id, .. } => *client_id,
        }
    }

    /// Serialize into a freshly allocated buffer sized to
    /// `total_packet_size`, per spec.md §9's "fresh buffer per call" rule.
    pub fn serialize(&self) -> Vec<u8> {
        let mut w = WriteCursor::with_capacity(ENVELOPE_SIZE + 64);

        let envelope = Envelope {
            packet_type: self.packet_type(),
            total_packet_size: 0,
            current_tick: self.current_tick(),
            client_id: self.client_id(),
        };
        envelope.write(&mut w);

        match self {
            Packet::Join { name, .. } => {
                w.write_str(name);
            }
            Packet::InputState { samples, predicted_position, predicted_direction, voxel_edits, .. } => {
                w.write_u32(samples.len() as u32);
                for sample in samples {
                    w.write_u32(sample.action_flags);
                    w.write_f32(sample.mouse_dx);
                    w.write_f32(sample.mouse_dy);
                    w.write_u8(sample.flags_byte);
                    w.write_f32(sample.dt);
                }
                w.write_vec3(predicted_position.to_vec());
                w.write_vec3(*predicted_direction);
                write_voxel_edit_block(&mut w, voxel_edits);
            }
            Packet::AckSnapshot { game_state_tick, .. } => {
                w.write_u64(*game_state_tick);
            }
            Packet::PredictionErrorCorrection { acknowledged_tick, .. } => {
                w.write_u64(*acknowledged_tick);
            }
            Packet::Handshake {
                grid_edge_size,
                voxel_size,
                chunk_count,
                max_chunks,
                assigned_client_index,
                players,
                ..
            } => {
                w.write_u32(*grid_edge_size);
                w.write_f32(*voxel_size);
                w.write_u32(*chunk_count);
                w.write_u32(*max_chunks);
                w.write_u32(*assigned_client_index);
                w.write_u32(players.len() as u32);
                for player in players {
                    write_player_init(&mut w, player);
                }
            }
            Packet::ChunkVoxelsHardUpdate { is_first_in_burst, total_chunks_in_burst, chunks, .. } => {
                let high_bit = if *is_first_in_burst { 1u32 << 31 } else { 0 };
                w.write_u32(high_bit | (total_chunks_in_burst & 0x7FFF_FFFF));
                w.write_u32(chunks.len() as u32);
                for (cx, cy, cz, densities) in chunks {
                    w.write_u8(*cx);
                    w.write_u8(*cy);
                    w.write_u8(*cz);
                    for density in densities.iter() {
                        w.write_u8(density.0);
                    }
                }
            }
            Packet::GameStateSnapshot { previous_client_tick, voxel_corrections, remote_players, .. } => {
                w.write_u64(*previous_client_tick);
                write_voxel_edit_block(&mut w, voxel_corrections);
                w.write_u32(remote_players.len() as u32);
                for block in remote_players {
                    w.write_u16(block.client_id);
                    w.write_vec3(block.position.to_vec());
                    w.write_vec3(block.direction);
                    w.write_vec3(block.velocity);
                    w.write_vec3(block.up);
                    for component in block.quaternion {
                        w.write_f32(component);
                    }
                    w.write_u32(block.action_flags);
                    w.write_u8(block.flags_byte());
                }
            }
            Packet::ClientJoined { player, .. } => {
                write_player_init(&mut w, player);
            }
        }

        let total_size = w.len() as u32;
        w.patch_u32(0, ((total_size) << 5) | envelope_low_bits(envelope.packet_type));
        w.into_bytes()
    }

    /// Parse a received datagram. Validates that the envelope's
    /// `total_packet_size` matches the datagram's actual length before
    /// reading the payload, per spec.md §7's malformed-packet rule.
    pub fn deserialize(datagram: &[u8]) -> NetResult<Self> {
        let mut r = ReadCursor::new(datagram);
        let envelope = Envelope::read(&mut r)?;
        if envelope.total_packet_size as usize != datagram.len() {
            return Err(NetError::SizeMismatch {
                declared: envelope.total_packet_size as usize,
                actual: datagram.len(),
            });
        }

        let current_tick = envelope.current_tick;
        let client_id = envelope.client_id;

        Ok(match envelope.packet_type {
            PacketType::Join => Packet::Join { current_tick, client_id, name: r.read_str()? },
            PacketType::InputState => {
                let sample_count = r.read_u32()?;
                let mut samples = Vec::with_capacity(sample_count as usize);
                for _ in 0..sample_count {
                    samples.push(CommandSample {
                        action_flags: r.read_u32()?,
                        mouse_dx: r.read_f32()?,
                        mouse_dy: r.read_f32()?,
                        flags_byte: r.read_u8()?,
                        dt: r.read_f32()?,
                    });
                }
                let predicted_position = Point3::from_vec(r.read_vec3()?);
                let predicted_direction = r.read_vec3()?;
                let voxel_edits = read_voxel_edit_block(&mut r)?;
                Packet::InputState {
                    current_tick,
                    client_id,
                    samples,
                    predicted_position,
                    predicted_direction,
                    voxel_edits,
                }
            }
            PacketType::AckSnapshot => Packet::AckSnapshot { current_tick, client_id, game_state_tick: r.read_u64()? },
            PacketType::PredictionErrorCorrection => {
                Packet::PredictionErrorCorrection { current_tick, client_id, acknowledged_tick: r.read_u64()? }
            }
            PacketType::Handshake => {
                let grid_edge_size = r.read_u32()?;
                let voxel_size = r.read_f32()?;
                let chunk_count = r.read_u32()?;
                let max_chunks = r.read_u32()?;
                let assigned_client_index = r.read_u32()?;
                let player_count = r.read_u32()?;
                let mut players = Vec::with_capacity(player_count as usize);
                for _ in 0..player_count {
                    players.push(read_player_init(&mut r)?);
                }
                Packet::Handshake {
                    current_tick,
                    client_id,
                    grid_edge_size,
                    voxel_size,
                    chunk_count,
                    max_chunks,
                    assigned_client_index,
                    players,
                }
            }
            PacketType::ChunkVoxelsHardUpdate => {
                let combined = r.read_u32()?;
                let is_first_in_burst = combined & (1 << 31) != 0;
                let total_chunks_in_burst = combined & 0x7FFF_FFFF;
                let chunks_in_this_packet = r.read_u32()?;
                let mut chunks = Vec::with_capacity(chunks_in_this_packet as usize);
                for _ in 0..chunks_in_this_packet {
                    let cx = r.read_u8()?;
                    let cy = r.read_u8()?;
                    let cz = r.read_u8()?;
                    let mut densities = Box::new([Density::EMPTY; VOXELS_PER_CHUNK]);
                    for slot in densities.iter_mut() {
                        *slot = Density(r.read_u8()?);
                    }
                    chunks.push((cx, cy, cz, densities));
                }
                Packet::ChunkVoxelsHardUpdate {
                    current_tick,
                    client_id,
                    is_first_in_burst,
                    total_chunks_in_burst,
                    chunks,
                }
            }
            PacketType::GameStateSnapshot => {
                let previous_client_tick = r.read_u64()?;
                let voxel_corrections = read_voxel_edit_block(&mut r)?;
                let remote_player_count = r.read_u32()?;
                let mut remote_players = Vec::with_capacity(remote_player_count as usize);
                for _ in 0..remote_player_count {
                    let remote_client_id = r.read_u16()?;
                    let position = Point3::from_vec(r.read_vec3()?);
                    let direction = r.read_vec3()?;
                    let velocity = r.read_vec3()?;
                    let up = r.read_vec3()?;
                    let quaternion = [r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?];
                    let action_flags = r.read_u32()?;
                    let (need_correction, need_voxel_correction, ignore, rolling) =
                        RemotePlayerBlock::from_flags_byte(r.read_u8()?);
                    remote_players.push(RemotePlayerBlock {
                        client_id: remote_client_id,
                        position,
                        direction,
                        velocity,
                        up,
                        quaternion,
                        action_flags,
                        need_correction,
                        need_voxel_correction,
                        ignore,
                        rolling,
                    });
                }
                Packet::GameStateSnapshot {
                    current_tick,
                    client_id,
                    previous_client_tick,
                    voxel_corrections,
                    remote_players,
                }
            }
            PacketType::ClientJoined => {
                Packet::ClientJoined { current_tick, client_id, player: read_player_init(&mut r)? }
            }
        })
    }
}

fn envelope_low_bits(packet_type: PacketType) -> u32 {
    let mode_bit = match packet_type.mode() {
        super::envelope::Mode::ClientToServer => 0,
        super::envelope::Mode::ServerToClient => 1,
    };
    let type_bits = match packet_type {
        PacketType::Join => 0,
        PacketType::InputState => 1,
        PacketType::AckSnapshot => 2,
        PacketType::PredictionErrorCorrection => 3,
        PacketType::Handshake => 4,
        PacketType::ChunkVoxelsHardUpdate => 5,
        PacketType::GameStateSnapshot => 6,
        PacketType::ClientJoined => 7,
    };
    mode_bit | (type_bits << 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_packet_round_trips() {
        let packet = Packet::Join { current_tick: 42, client_id: 0, name: "p1".to_string() };
        let bytes = packet.serialize();
        let parsed = Packet::deserialize(&bytes).unwrap();
        match parsed {
            Packet::Join { current_tick, client_id, name } => {
                assert_eq!(current_tick, 42);
                assert_eq!(client_id, 0);
                assert_eq!(name, "p1");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn handshake_round_trips_with_avatar_color() {
        let packet = Packet::Handshake {
            current_tick: 1,
            client_id: 0,
            grid_edge_size: 5,
            voxel_size: 9.0,
            chunk_count: 125,
            max_chunks: 125,
            assigned_client_index: 0,
            players: vec![PlayerInit {
                client_id: 0,
                name: "p1".to_string(),
                position: Point3::new(0.0, 70.0, 0.0),
                direction: Vector3::new(0.0, 0.0, 1.0),
                avatar_color: 3,
            }],
        };
        let bytes = packet.serialize();
        let parsed = Packet::deserialize(&bytes).unwrap();
        match parsed {
            Packet::Handshake { players, grid_edge_size, voxel_size, .. } => {
                assert_eq!(grid_edge_size, 5);
                assert_eq!(voxel_size, 9.0);
                assert_eq!(players[0].avatar_color, 3);
                assert_eq!(players[0].name, "p1");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn input_state_round_trips_voxel_edits() {
        let packet = Packet::InputState {
            current_tick: 5,
            client_id: 2,
            samples: vec![CommandSample { action_flags: 1, mouse_dx: 0.1, mouse_dy: -0.2, flags_byte: 0, dt: 1.0 / 60.0 }],
            predicted_position: Point3::new(1.0, 2.0, 3.0),
            predicted_direction: Vector3::new(0.0, 0.0, 1.0),
            voxel_edits: vec![ChunkVoxelEdits {
                chunk_linear_index: 42,
                voxels: vec![VoxelEdit { x: 1, y: 1, z: 1, value: 120 }],
            }],
        };
        let bytes = packet.serialize();
        let parsed = Packet::deserialize(&bytes).unwrap();
        match parsed {
            Packet::InputState { voxel_edits, samples, .. } => {
                assert_eq!(samples.len(), 1);
                assert_eq!(voxel_edits[0].chunk_linear_index, 42);
                assert_eq!(voxel_edits[0].voxels[0].value, 120);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let packet = Packet::AckSnapshot { current_tick: 0, client_id: 0, game_state_tick: 0 };
        let mut bytes = packet.serialize();
        bytes.push(0xFF);
        assert!(Packet::deserialize(&bytes).is_err());
    }

    #[test]
    fn game_state_snapshot_flags_byte_round_trips() {
        let packet = Packet::GameStateSnapshot {
            current_tick: 10,
            client_id: 1,
            previous_client_tick: 9,
            voxel_corrections: vec![],
            remote_players: vec![RemotePlayerBlock {
                client_id: 1,
                position: Point3::new(0.0, 0.0, 0.0),
                direction: Vector3::new(0.0, 0.0, 1.0),
                velocity: Vector3::new(0.0, 0.0, 0.0),
                up: Vector3::new(0.0, 1.0, 0.0),
                quaternion: [0.0, 0.0, 0.0, 1.0],
                action_flags: 0,
                need_correction: true,
                need_voxel_correction: false,
                ignore: false,
                rolling: true,
            }],
        };
        let bytes = packet.serialize();
        let parsed = Packet::deserialize(&bytes).unwrap();
        match parsed {
            Packet::GameStateSnapshot { remote_players, .. } => {
                assert!(remote_players[0].need_correction);
                assert!(!remote_players[0].need_voxel_correction);
                assert!(remote_players[0].rolling);
            }
            _ => panic!("wrong variant"),
        }
    }
}
