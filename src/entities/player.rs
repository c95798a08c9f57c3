//! Player data (C6) — pure data, no methods.

use crate::camera::FollowCameraData;
use cgmath::{Point3, Quaternion, Vector3};

/// Per-tick input action bits (spec.md §3). `flags_byte` on the wire
/// carries the two mode toggles separately; these are the eleven
/// per-sample actions.
pub mod action {
    pub const FORWARD: u32 = 1 << 0;
    pub const LEFT: u32 = 1 << 1;
    pub const BACK: u32 = 1 << 2;
    pub const RIGHT: u32 = 1 << 3;
    pub const UP: u32 = 1 << 4;
    pub const DOWN: u32 = 1 << 5;
    pub const RUN: u32 = 1 << 6;
    pub const SHOOT: u32 = 1 << 7;
    pub const TERRAFORM_ADD: u32 = 1 << 8;
    pub const TERRAFORM_DESTROY: u32 = 1 << 9;
    pub const JUMP: u32 = 1 << 10;
}

/// The two orthogonal mode toggles carried in a command sample's `flags_byte`.
pub mod mode_flag {
    pub const ROLLING: u8 = 1 << 0;
    pub const THIRD_PERSON_CAMERA: u8 = 1 << 1;
}

/// Which side owns this player's authoritative state, per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRole {
    /// This client predicts this player's motion locally, ahead of the server.
    LocalAuthoritativePrediction,
    /// A non-local player, rendered from buffered, interpolated snapshots.
    RemoteInterpolated,
    /// The server's own copy of every player, the source of truth.
    ServerAuthoritative,
}

#[derive(Debug, Clone)]
pub struct PlayerData {
    pub client_id: u32,
    pub name: String,

    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub up: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub size: f32,

    pub rolling: bool,
    pub in_air: bool,
    pub entering_world: bool,
    pub sitting: bool,
    pub network_role: NetworkRole,

    pub previous_action_mask: u32,
    pub action_mask: u32,
    pub shoot_cooldown: f32,

    pub camera: FollowCameraData,
    pub animation_cycle_id: u32,

    /// Accumulated rotation angle for the rolling-mode sphere integrator,
    /// reset to zero whenever the player switches back to upright mode
    /// (spec.md §9).
    pub rolling_angle: f32,
}

impl PlayerData {
    pub fn new(client_id: u32, name: String, position: Point3<f32>, direction: Vector3<f32>, network_role: NetworkRole) -> Self {
        Self {
            client_id,
            name,
            position,
            direction,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            size: 1.0,
            rolling: false,
            in_air: true,
            entering_world: true,
            sitting: false,
            network_role,
            previous_action_mask: 0,
            action_mask: 0,
            shoot_cooldown: 0.0,
            camera: FollowCameraData::default(),
            animation_cycle_id: 0,
            rolling_angle: 0.0,
        }
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        Vector3::new(self.size, self.size, self.size)
    }
}
