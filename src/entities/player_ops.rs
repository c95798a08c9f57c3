//! Player kinematic integrators (C6) — pure functions over [`PlayerData`].
//!
//! Both modes are cases of the same pure-function shape spec.md §9 asks
//! for: `(state, input, dt) -> state`. Collision resolution against the
//! terrain is a separate step ([`crate::physics::resolve_collision`])
//! applied by the caller after velocity has been computed here.

use super::player::{action, mode_flag, PlayerData};
use crate::constants::{
    GRAVITY, ROLLING_ACCELERATION, ROLLING_FRICTION_COEFFICIENT, UPRIGHT_RUN_MULTIPLIER, UPRIGHT_WALK_SPEED,
};
use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3, Zero};

/// Forward/right input axes derived from view direction and up (shared by
/// both modes).
fn input_axes(direction: Vector3<f32>, up: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let right = direction.cross(up).normalize();
    let forward = up.cross(right).normalize();
    (forward, right)
}

fn planar_input(action_mask: u32, forward: Vector3<f32>, right: Vector3<f32>) -> Vector3<f32> {
    let mut v = Vector3::zero();
    if action_mask & action::FORWARD != 0 {
        v += forward;
    }
    if action_mask & action::BACK != 0 {
        v -= forward;
    }
    if action_mask & action::RIGHT != 0 {
        v += right;
    }
    if action_mask & action::LEFT != 0 {
        v -= right;
    }
    if v.magnitude2() > 1e-8 {
        v.normalize()
    } else {
        v
    }
}

/// Apply gravity along `-up`, shared by both modes.
pub fn apply_gravity(player: &mut PlayerData, dt: f32) {
    player.velocity -= player.up * GRAVITY * dt;
}

/// Upright-mode step: in-air only gravity integrates; grounded, input axes
/// set horizontal velocity directly at `UPRIGHT_WALK_SPEED` (doubled while
/// running). View direction does not get rotated here — only by input.
pub fn step_upright(player: &mut PlayerData, dt: f32) {
    if player.in_air {
        apply_gravity(player, dt);
        return;
    }

    let (forward, right) = input_axes(player.direction, player.up);
    let planar = planar_input(player.action_mask, forward, right);
    let speed = if player.action_mask & action::RUN != 0 {
        UPRIGHT_WALK_SPEED * UPRIGHT_RUN_MULTIPLIER
    } else {
        UPRIGHT_WALK_SPEED
    };

    let vertical = player.velocity.project_on(player.up);
    player.velocity = planar * speed + vertical;
}

/// Rolling-mode step: a sphere accelerated in-plane by input, with ground
/// friction proportional to velocity, its orientation derived from
/// distance traveled divided by circumference.
pub fn step_rolling(player: &mut PlayerData, dt: f32) {
    apply_gravity(player, dt);

    let (forward, right) = input_axes(player.direction, player.up);
    let planar = planar_input(player.action_mask, forward, right);
    player.velocity += planar * ROLLING_ACCELERATION * dt;

    if !player.in_air {
        player.velocity -= player.velocity * (ROLLING_FRICTION_COEFFICIENT * GRAVITY * dt).min(1.0);
    }

    let motion = player.velocity * dt;
    let distance = motion.magnitude();
    if distance < 1e-8 {
        return;
    }

    let circumference = 2.0 * std::f32::consts::PI * player.size;
    let delta_angle = distance / circumference * 2.0 * std::f32::consts::PI;
    player.rolling_angle += delta_angle;

    let axis = motion.cross(player.up);
    if axis.magnitude2() < 1e-10 {
        return;
    }
    let axis = axis.normalize();
    let step_rotation = Quaternion::from_axis_angle(axis, Rad(delta_angle));
    player.orientation = (step_rotation * player.orientation).normalize();
}

/// Switch to upright mode, resetting the rolling integrator's accumulated
/// rotation per spec.md §9.
pub fn set_upright_mode(player: &mut PlayerData) {
    player.rolling = false;
    player.rolling_angle = 0.0;
}

pub fn set_rolling_mode(player: &mut PlayerData) {
    player.rolling = true;
}

/// Advance one player for one simulation step given the flags on its
/// current command sample, dispatching to the active mode's integrator.
pub fn step(player: &mut PlayerData, dt: f32) {
    if player.rolling {
        step_rolling(player, dt);
    } else {
        step_upright(player, dt);
    }

    if player.action_mask & action::JUMP != 0 && !player.in_air {
        player.velocity += player.up * (2.0 * GRAVITY).sqrt();
    }

    player.shoot_cooldown = (player.shoot_cooldown - dt).max(0.0);
}

/// Apply the two mode-toggle bits from a command sample's `flags_byte`.
pub fn apply_mode_flags(player: &mut PlayerData, flags_byte: u8) {
    let wants_rolling = flags_byte & mode_flag::ROLLING != 0;
    if wants_rolling && !player.rolling {
        set_rolling_mode(player);
    } else if !wants_rolling && player.rolling {
        set_upright_mode(player);
    }
}
