//! The fixed 16-byte packet envelope (C1), per spec.md §4.1/§6:
//! a packed 32-bit word (mode bit, 4-bit type, 27-bit total size), a
//! 64-bit tick, and a 32-bit client id.

use super::cursor::{ReadCursor, WriteCursor};
use crate::error::{NetError, NetResult};

pub const ENVELOPE_SIZE: usize = 4 + 8 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ClientToServer,
    ServerToClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Join,
    InputState,
    AckSnapshot,
    PredictionErrorCorrection,
    Handshake,
    ChunkVoxelsHardUpdate,
    GameStateSnapshot,
    ClientJoined,
}

impl PacketType {
    fn to_bits(self) -> u32 {
        match self {
            PacketType::Join => 0,
            PacketType::InputState => 1,
            PacketType::AckSnapshot => 2,
            PacketType::PredictionErrorCorrection => 3,
            PacketType::Handshake => 4,
            PacketType::ChunkVoxelsHardUpdate => 5,
            PacketType::GameStateSnapshot => 6,
            PacketType::ClientJoined => 7,
        }
    }

    fn from_bits(bits: u32) -> NetResult<Self> {
        Ok(match bits {
            0 => PacketType::Join,
            1 => PacketType::InputState,
            2 => PacketType::AckSnapshot,
            3 => PacketType::PredictionErrorCorrection,
            4 => PacketType::Handshake,
            5 => PacketType::ChunkVoxelsHardUpdate,
            6 => PacketType::GameStateSnapshot,
            7 => PacketType::ClientJoined,
            other => return Err(NetError::UnknownPacketType(other)),
        })
    }

    pub fn mode(self) -> Mode {
        match self {
            PacketType::Join | PacketType::InputState | PacketType::AckSnapshot | PacketType::PredictionErrorCorrection => {
                Mode::ClientToServer
            }
            PacketType::Handshake | PacketType::ChunkVoxelsHardUpdate | PacketType::GameStateSnapshot | PacketType::ClientJoined => {
                Mode::ServerToClient
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub packet_type: PacketType,
    pub total_packet_size: u32,
    pub current_tick: u64,
    pub client_id: u32,
}

impl Envelope {
    pub fn write(&self, cursor: &mut WriteCursor) {
        let mode_bit = match self.packet_type.mode() {
            Mode::ClientToServer => 0u32,
            Mode::ServerToClient => 1u32,
        };
        let packed = mode_bit | (self.packet_type.to_bits() << 1) | (self.total_packet_size << 5);
        cursor.write_u32(packed);
        cursor.write_u64(self.current_tick);
        cursor.write_u32(self.client_id);
    }

    pub fn read(cursor: &mut ReadCursor) -> NetResult<Self> {
        let packed = cursor.read_u32()?;
        let type_bits = (packed >> 1) & 0b1111;
        let total_packet_size = packed >> 5;
        let packet_type = PacketType::from_bits(type_bits)?;

        let current_tick = cursor.read_u64()?;
        let client_id = cursor.read_u32()?;

        Ok(Self {
            packet_type,
            total_packet_size,
            current_tick,
            client_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_through_packed_word() {
        let envelope = Envelope {
            packet_type: PacketType::GameStateSnapshot,
            total_packet_size: 1234,
            current_tick: 99_999,
            client_id: 7,
        };
        let mut w = WriteCursor::new();
        envelope.write(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), ENVELOPE_SIZE);

        let mut r = ReadCursor::new(&bytes);
        let parsed = Envelope::read(&mut r).unwrap();
        assert_eq!(parsed.packet_type, PacketType::GameStateSnapshot);
        assert_eq!(parsed.total_packet_size, 1234);
        assert_eq!(parsed.current_tick, 99_999);
        assert_eq!(parsed.client_id, 7);
    }

    #[test]
    fn unknown_type_bits_are_rejected() {
        let mut w = WriteCursor::new();
        // mode=0, type=15 (reserved), size=0
        w.write_u32(0b1111 << 1);
        w.write_u64(0);
        w.write_u32(0);
        let bytes = w.into_bytes();
        let mut r = ReadCursor::new(&bytes);
        assert!(Envelope::read(&mut r).is_err());
    }
}
