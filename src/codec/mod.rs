//! Wire codec (C1): cursor primitives, the fixed envelope, and the
//! tagged-variant packet set built on top of them.

pub mod cursor;
pub mod envelope;
pub mod packet;

pub use cursor::{ReadCursor, WriteCursor};
pub use envelope::{Envelope, Mode, PacketType, ENVELOPE_SIZE};
pub use packet::{ChunkVoxelEdits, CommandSample, Packet, PlayerInit, RemotePlayerBlock, VoxelEdit};
