//! voxfall-net — Data-Oriented Programming (DOP) Architecture
//!
//! A networked multiplayer voxel-world core: client-side prediction and
//! server reconciliation over UDP, marching-cubes terrain, and ellipsoid-
//! vs-terrain collision. Every module follows this codebase's `*_data`
//! (plain structs, no methods) / `*_operations`/`*_ops` (pure free
//! functions) split; state lives in the three top-level records in
//! [`state`], threaded explicitly through whichever tick function is
//! driving it rather than reached through globals.

pub mod camera;
pub mod codec;
pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod net;
pub mod physics;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::FollowCameraData;
pub use codec::Packet;
pub use config::Config;
pub use entities::{BulletStore, NetworkRole, PlayerData};
pub use error::{NetError, NetResult};
pub use net::{handle_join, CommandBuffer, RemoteInterpolator, ServerState};
pub use physics::CollisionOutcome;
pub use state::SimulationState;
pub use tick::{RateAccumulator, TickClock};
pub use world::{ChunkGrid, Density};
