//! Remote-player interpolation (C10), per spec.md §4.4.
//!
//! Each non-local player holds a ring of buffered snapshots. Interpolation
//! only begins once warmed up (tolerating one packet loss without
//! stalling); the action bitmask and rolling flag are inherited step-wise
//! from the tail sample rather than blended, so animation transitions stay
//! deterministic.

use crate::constants::{REMOTE_INTERPOLATION_WARMUP, REMOTE_SNAPSHOT_RING_CAPACITY};
use cgmath::{Point3, Quaternion, Vector3};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub struct RemoteSnapshot {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub up: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub action_flags: u32,
    pub rolling: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderState {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub up: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub action_flags: u32,
    pub rolling: bool,
}

impl RenderState {
    fn from_snapshot(snapshot: &RemoteSnapshot) -> Self {
        Self {
            position: snapshot.position,
            direction: snapshot.direction,
            velocity: snapshot.velocity,
            up: snapshot.up,
            orientation: snapshot.orientation,
            action_flags: snapshot.action_flags,
            rolling: snapshot.rolling,
        }
    }

    fn blend(tail: &RemoteSnapshot, successor: &RemoteSnapshot, t: f32) -> Self {
        Self {
            position: tail.position + (successor.position - tail.position) * t,
            direction: tail.direction + (successor.direction - tail.direction) * t,
            velocity: tail.velocity + (successor.velocity - tail.velocity) * t,
            up: tail.up + (successor.up - tail.up) * t,
            orientation: tail.orientation.slerp(successor.orientation, t),
            action_flags: tail.action_flags,
            rolling: tail.rolling,
        }
    }
}

pub struct RemoteInterpolator {
    ring: VecDeque<RemoteSnapshot>,
    elapsed: f32,
    started: bool,
}

impl RemoteInterpolator {
    pub fn new() -> Self {
        Self { ring: VecDeque::with_capacity(REMOTE_SNAPSHOT_RING_CAPACITY), elapsed: 0.0, started: false }
    }

    pub fn push(&mut self, snapshot: RemoteSnapshot) {
        if self.ring.len() >= REMOTE_SNAPSHOT_RING_CAPACITY {
            self.ring.pop_front();
        }
        self.ring.push_back(snapshot);
    }

    pub fn buffered_len(&self) -> usize {
        self.ring.len()
    }

    /// Advance the interpolation clock by `dt` against the server's
    /// snapshot rate and return the renderer-visible blended state, or
    /// `None` if still waiting out the warmup.
    pub fn advance(&mut self, dt: f32, snapshot_rate: f32) -> Option<RenderState> {
        if !self.started {
            if self.ring.len() < REMOTE_INTERPOLATION_WARMUP {
                return None;
            }
            self.started = true;
        }

        self.elapsed += dt;
        let period = 1.0 / snapshot_rate;
        while self.elapsed >= period && self.ring.len() > 1 {
            self.ring.pop_front();
            self.elapsed -= period;
        }

        if self.ring.len() < 2 {
            return self.ring.front().map(RenderState::from_snapshot);
        }

        let t = (self.elapsed / period).clamp(0.0, 1.0);
        Some(RenderState::blend(&self.ring[0], &self.ring[1], t))
    }
}

impl Default for RemoteInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    fn snapshot(x: f32) -> RemoteSnapshot {
        RemoteSnapshot {
            position: Point3::new(x, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
            velocity: Vector3::zero(),
            up: Vector3::new(0.0, 1.0, 0.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            action_flags: 0,
            rolling: false,
        }
    }

    #[test]
    fn withholds_until_warmup() {
        let mut interpolator = RemoteInterpolator::new();
        interpolator.push(snapshot(0.0));
        interpolator.push(snapshot(1.0));
        assert!(interpolator.advance(1.0 / 40.0, 20.0).is_none());
    }

    #[test]
    fn blends_halfway_between_tail_and_successor() {
        let mut interpolator = RemoteInterpolator::new();
        interpolator.push(snapshot(0.0));
        interpolator.push(snapshot(1.0));
        interpolator.push(snapshot(2.0));

        let state = interpolator.advance(0.5 * (1.0 / 20.0), 20.0).unwrap();
        assert!((state.position.x - 0.5).abs() < 1e-5);
    }
}
