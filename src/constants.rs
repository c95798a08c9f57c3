//! Tunable constants for the simulation core.
//!
//! Mirrors the magic numbers the original C++ client/server hard-coded in
//! `world.hpp`/`network.cpp` (see `original_source/` in the retrieval pack):
//! a 16-voxel chunk edge, a surface threshold of 60, a 25 Hz command rate
//! and a 20 Hz snapshot rate. [`crate::config::NetConfig`] lets an embedder
//! override all of these at runtime; these are the defaults.

/// Edge length of a single voxel chunk (E in the spec).
pub const CHUNK_EDGE: u32 = 16;

/// Total voxel slots in one chunk, `E^3`.
pub const VOXELS_PER_CHUNK: usize = (CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE) as usize;

/// Upper bound on a chunk's vertex cache, `5*(E-1)^3`.
pub const MAX_VERTICES_PER_CHUNK: usize = 5 * ((CHUNK_EDGE - 1) * (CHUNK_EDGE - 1) * (CHUNK_EDGE - 1)) as usize;

/// Voxel density surface threshold (S). Densities strictly above this are solid.
pub const SURFACE_THRESHOLD: u8 = 60;

/// Sentinel density meaning "client's predicted value was correct".
pub const VOXEL_SENTINEL: u8 = 255;

/// Maximum density a terraform write may reach; keeps `VOXEL_SENTINEL` unambiguous.
pub const MAX_VOXEL_DENSITY: u8 = 254;

/// Default chunk-grid edge length (G). The grid holds `G^3` chunk slots.
pub const DEFAULT_GRID_EDGE: u32 = 5;

/// Default world-space size of one voxel.
pub const DEFAULT_VOXEL_SIZE: f32 = 9.0;

/// Client command production rate, in Hz.
pub const DEFAULT_COMMAND_RATE: f32 = 25.0;

/// Server snapshot dispatch rate, in Hz.
pub const DEFAULT_SNAPSHOT_RATE: f32 = 20.0;

/// Positional prediction-divergence threshold, in world units.
pub const DEFAULT_EPSILON_POSITION: f32 = 0.1;

/// Directional prediction-divergence threshold (component-wise).
pub const DEFAULT_EPSILON_DIRECTION: f32 = 0.1;

/// Maximum distinct chunks the server tracks history for between snapshots.
pub const MAX_MODIFIED_CHUNKS: usize = 32;

/// Maximum bulk terraform ray-cast distance, in world units.
pub const DEFAULT_TERRAFORM_REACH: f32 = 40.0;

/// Default rate of density change applied by terraform tools (units/second).
pub const DEFAULT_TERRAFORM_SPEED: f32 = 300.0;

/// Radius, in voxels, of the destructive sphere a bullet impact carves.
pub const BULLET_EXPLOSION_RADIUS: i32 = 2;

/// Gravitational acceleration along `-up`, in m/s^2.
pub const GRAVITY: f32 = 9.81;

/// Upright-mode ground walk speed, in m/s.
pub const UPRIGHT_WALK_SPEED: f32 = 2.5;

/// Upright-mode ground run-speed multiplier.
pub const UPRIGHT_RUN_MULTIPLIER: f32 = 2.0;

/// Rolling-mode in-plane input acceleration, in m/s^2.
pub const ROLLING_ACCELERATION: f32 = 20.0;

/// Rolling-mode ground friction coefficient (combined with gravity).
pub const ROLLING_FRICTION_COEFFICIENT: f32 = 0.5;

/// Camera up-vector blend rate, per second, toward the player's local up.
pub const CAMERA_UP_BLEND_RATE: f32 = 3.0;

/// Maximum collision-resolver slide recursion depth.
pub const MAX_COLLISION_RECURSION: u32 = 5;

/// Safety margin the collision resolver backs off from a contact, in world units.
pub const COLLISION_SAFETY_MARGIN: f32 = 0.01;

/// Capacity of each remote player's interpolation snapshot ring.
pub const REMOTE_SNAPSHOT_RING_CAPACITY: usize = 40;

/// Minimum buffered remote snapshots before interpolation begins.
pub const REMOTE_INTERPOLATION_WARMUP: usize = 3;

/// Per-chunk cap on the server's recorded modified-voxel indices.
pub fn max_modified_voxels_per_chunk() -> usize {
    (CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE) as usize / 4
}

/// Default UDP port the server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 6000;

/// Default UDP port the client listens on.
pub const DEFAULT_CLIENT_PORT: u16 = 6001;

/// Soft cap on a single datagram's body size.
pub const MAX_DATAGRAM_SIZE: usize = 40 * 1024;

/// Bound on packets drained from the socket in a single tick, beyond the
/// fixed `1 +` term, scaled by the number of connected clients.
pub const DRAIN_BUDGET_BASE: usize = 1;
pub const DRAIN_BUDGET_PER_CLIENT: usize = 2;

/// Capacity of the client's outgoing command ring (§7's "rotating buffer
/// with a difference counter"). Sized generously above one transmit
/// interval's worth of samples at the default command rate so ordinary
/// jitter never drops anything; overflow still drops the oldest sample
/// rather than blocking.
pub const COMMAND_RING_CAPACITY: usize = 128;

/// Per-chunk wire cost of one CHUNK_VOXELS_HARD_UPDATE entry: 3 coord bytes
/// plus the full density buffer.
const HARD_SYNC_CHUNK_WIRE_SIZE: usize = 3 + VOXELS_PER_CHUNK;

/// How many whole chunks fit in one hard-sync packet body alongside the
/// envelope and the `combined_flag_and_count`/`chunks_in_this_packet`
/// header words, without exceeding [`MAX_DATAGRAM_SIZE`].
pub fn chunks_per_hard_sync_packet() -> usize {
    let overhead = 16 + 4 + 4;
    (MAX_DATAGRAM_SIZE - overhead) / HARD_SYNC_CHUNK_WIRE_SIZE
}
