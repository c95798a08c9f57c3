//! Ellipsoid-vs-terrain collision result — pure data, no methods.

use cgmath::{Point3, Vector3};

/// Outcome of one collision-resolver step (C5), per spec.md §4.5.
#[derive(Debug, Clone, Copy)]
pub struct CollisionOutcome {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    pub contact_normal: Vector3<f32>,
    pub collided: bool,
    pub in_air: bool,
    pub under_terrain: bool,
}

impl CollisionOutcome {
    pub fn no_collision(position: Point3<f32>, velocity: Vector3<f32>) -> Self {
        Self {
            position,
            velocity,
            contact_normal: Vector3::new(0.0, 1.0, 0.0),
            collided: false,
            in_air: true,
            under_terrain: false,
        }
    }
}

/// One candidate triangle, already expressed in ellipsoid space, tested
/// against the swept sphere during a single resolver step.
#[derive(Debug, Clone, Copy)]
pub struct EllipsoidTriangle {
    pub a: Point3<f32>,
    pub b: Point3<f32>,
    pub c: Point3<f32>,
}

impl EllipsoidTriangle {
    pub fn normal(&self) -> Vector3<f32> {
        use cgmath::InnerSpace;
        (self.b - self.a).cross(self.c - self.a).normalize()
    }
}

/// The single closest collision found across all candidate triangles this
/// step, in ellipsoid space.
#[derive(Debug, Clone, Copy)]
pub struct SweptCollision {
    pub travel_distance: f32,
    pub contact_point: Point3<f32>,
    pub normal: Vector3<f32>,
}
