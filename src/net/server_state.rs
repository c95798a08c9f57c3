//! Server-side per-client connection bookkeeping (C8/C9), per spec.md §4.3's
//! back-pressure rule and §5's ownership notes.

use crate::codec::{ChunkVoxelEdits, CommandSample};
use cgmath::{Point3, Vector3};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;

/// One connected client's queued input and last-claimed predicted state.
pub struct ClientConnection {
    pub client_id: u32,
    pub addr: SocketAddr,
    pub command_queue: VecDeque<CommandSample>,
    pub claimed_position: Point3<f32>,
    pub claimed_direction: Vector3<f32>,
    pub claimed_voxel_edits: Vec<ChunkVoxelEdits>,
    pub received_since_snapshot: bool,
    /// Guarded separately from the rest of the connection so the
    /// optional receiver-thread variant (§5, not implemented by this
    /// crate) could flip it from outside the tick loop without taking a
    /// lock on the whole connection.
    correction_pending: Mutex<bool>,
}

impl ClientConnection {
    pub fn new(client_id: u32, addr: SocketAddr, position: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            client_id,
            addr,
            command_queue: VecDeque::new(),
            claimed_position: position,
            claimed_direction: direction,
            claimed_voxel_edits: Vec::new(),
            received_since_snapshot: false,
            correction_pending: Mutex::new(false),
        }
    }

    pub fn is_correction_pending(&self) -> bool {
        *self.correction_pending.lock()
    }

    pub fn set_correction_pending(&self, pending: bool) {
        *self.correction_pending.lock() = pending;
    }
}

/// All connected clients, keyed by `client_id`. Lives in the top-level
/// network record threaded through the tick function (spec.md §9).
pub struct ServerState {
    pub clients: FxHashMap<u32, ClientConnection>,
    next_client_id: u32,
}

impl ServerState {
    pub fn new() -> Self {
        Self { clients: FxHashMap::default(), next_client_id: 0 }
    }

    /// Allocate the next client id and register a connection for it.
    pub fn connect(&mut self, addr: SocketAddr, position: Point3<f32>, direction: Vector3<f32>) -> u32 {
        let client_id = self.next_client_id;
        self.next_client_id += 1;
        self.clients.insert(client_id, ClientConnection::new(client_id, addr, position, direction));
        client_id
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_allocates_sequential_client_ids() {
        let mut server = ServerState::new();
        let addr: SocketAddr = "127.0.0.1:6001".parse().unwrap();
        let first = server.connect(addr, Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let second = server.connect(addr, Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn correction_guard_starts_clear() {
        let connection = ClientConnection::new(0, "127.0.0.1:6001".parse().unwrap(), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!connection.is_correction_pending());
        connection.set_correction_pending(true);
        assert!(connection.is_correction_pending());
    }
}
