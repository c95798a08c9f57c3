//! Bullet store (C6 ancillary) — pure data, no methods.
//!
//! Struct-of-arrays arena with a free-list stack of dead slots, the same
//! index-not-pointer shape spec.md §9 describes for avoiding dangling
//! references.

use cgmath::{Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct BulletSlot {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub size: f32,
    pub up: Vector3<f32>,
    pub burnable: bool,
    pub owner: u32,
    pub dead: bool,
}

impl Default for BulletSlot {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            size: 1.0,
            up: Vector3::new(0.0, 1.0, 0.0),
            burnable: false,
            owner: 0,
            dead: true,
        }
    }
}

pub struct BulletStore {
    pub slots: Vec<BulletSlot>,
    pub free_list: Vec<usize>,
}

impl BulletStore {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (usize, &BulletSlot)> {
        self.slots.iter().enumerate().filter(|(_, s)| !s.dead)
    }
}

impl Default for BulletStore {
    fn default() -> Self {
        Self::new()
    }
}
