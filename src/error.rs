//! Crate-wide error type.
//!
//! Every fallible operation in the simulation core returns [`NetError`]
//! rather than panicking. The tick loop (§7 of SPEC_FULL.md) treats most
//! variants as silently-recoverable: a malformed packet or an out-of-bounds
//! edit is logged at `warn!` and the packet/edit is dropped, it never
//! propagates into a panic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("codec: cursor overran buffer (wanted {wanted} bytes, {available} available)")]
    CursorOverrun { wanted: usize, available: usize },

    #[error("codec: packet size mismatch (header said {declared}, datagram was {actual})")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("codec: unknown packet type {0}")]
    UnknownPacketType(u32),

    #[error("codec: string field was not valid UTF-8")]
    InvalidString,

    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),

    #[error("transport: datagram of {size} bytes exceeds the {max} byte bound")]
    DatagramTooLarge { size: usize, max: usize },

    #[error("world: chunk coordinate {x},{y},{z} is outside the grid (edge {grid_edge})")]
    ChunkOutOfBounds { x: i32, y: i32, z: i32, grid_edge: u32 },

    #[error("world: voxel coordinate {x},{y},{z} is outside the chunk (edge {chunk_edge})")]
    VoxelOutOfBounds { x: i32, y: i32, z: i32, chunk_edge: u32 },

    #[error("world: no chunk loaded at {0:?}")]
    ChunkNotLoaded((i32, i32, i32)),

    #[error("network: unknown client id {0}")]
    UnknownClient(u32),

    #[error("network: client {0} has a correction pending and may not submit input yet")]
    CorrectionPending(u32),

    #[error("config: invalid value for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("config: {0}")]
    ConfigIo(String),
}

pub type NetResult<T> = Result<T, NetError>;
