//! Top-level state records (spec.md §9): world, entities, and network each
//! live in one plain data struct threaded explicitly through the tick
//! function, mirroring the `EngineBuffers` shape this codebase uses
//! elsewhere — no global mutable singletons, no methods beyond
//! construction.

use crate::config::Config;
use crate::entities::{BulletStore, PlayerData};
use crate::net::{CommandBuffer, RemoteInterpolator, ServerState};
use crate::tick::{RateAccumulator, TickClock};
use crate::world::ChunkGrid;
use rustc_hash::FxHashMap;

pub struct WorldState {
    pub grid: ChunkGrid,
}

impl WorldState {
    pub fn new(config: &Config, is_server: bool) -> Self {
        Self { grid: ChunkGrid::new(config.world.grid_edge, config.world.voxel_size, config.world.surface_threshold, is_server) }
    }
}

pub struct EntityState {
    pub players: FxHashMap<u32, PlayerData>,
    pub bullets: BulletStore,
    /// Set on the client only: which entry in `players` is locally predicted.
    pub local_client_id: Option<u32>,
    /// Client only: one interpolation ring per remote player.
    pub remote_interpolators: FxHashMap<u32, RemoteInterpolator>,
}

impl EntityState {
    pub fn new() -> Self {
        Self {
            players: FxHashMap::default(),
            bullets: BulletStore::new(),
            local_client_id: None,
            remote_interpolators: FxHashMap::default(),
        }
    }
}

impl Default for EntityState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct NetworkState {
    pub tick: TickClock,
    pub command_rate: RateAccumulator,
    pub snapshot_rate: RateAccumulator,
    /// Client only: outgoing samples awaiting the next INPUT_STATE flush.
    pub command_buffer: CommandBuffer,
    /// Server only: per-client connection bookkeeping.
    pub server: Option<ServerState>,
}

impl NetworkState {
    pub fn new_client(config: &Config) -> Self {
        Self {
            tick: TickClock::new(),
            command_rate: RateAccumulator::new(config.net.command_rate_hz),
            snapshot_rate: RateAccumulator::new(config.net.snapshot_rate_hz),
            command_buffer: CommandBuffer::new(),
            server: None,
        }
    }

    pub fn new_server(config: &Config) -> Self {
        Self {
            tick: TickClock::new(),
            command_rate: RateAccumulator::new(config.net.command_rate_hz),
            snapshot_rate: RateAccumulator::new(config.net.snapshot_rate_hz),
            command_buffer: CommandBuffer::new(),
            server: Some(ServerState::new()),
        }
    }
}

/// The whole simulation core's state, handed by `&mut` reference into
/// whichever tick function is driving it (client or server). Nothing here
/// is reachable except through this record.
pub struct SimulationState {
    pub world: WorldState,
    pub entities: EntityState,
    pub network: NetworkState,
}

impl SimulationState {
    pub fn new_client(config: &Config) -> Self {
        Self { world: WorldState::new(config, false), entities: EntityState::new(), network: NetworkState::new_client(config) }
    }

    pub fn new_server(config: &Config) -> Self {
        Self { world: WorldState::new(config, true), entities: EntityState::new(), network: NetworkState::new_server(config) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_state_has_no_server_connections() {
        let state = SimulationState::new_client(&Config::default());
        assert!(state.network.server.is_none());
        assert!(!state.world.grid.is_server);
    }

    #[test]
    fn server_state_initializes_empty_client_table() {
        let state = SimulationState::new_server(&Config::default());
        assert!(state.network.server.unwrap().clients.is_empty());
        assert!(state.world.grid.is_server);
    }
}
