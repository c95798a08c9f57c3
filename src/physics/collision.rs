//! Ellipsoid-vs-terrain sliding collision (C5), per spec.md §4.5.
//!
//! Pure functions: no resolver object, a `step`
//! function that takes position/velocity/half-extents/grid and returns a
//! [`CollisionOutcome`]. Candidate geometry is produced by re-triangulating
//! the lattice cells the swept ellipsoid might touch with the same
//! marching-cubes code the mesh cache uses (`world::mesh::triangulate_cell`),
//! not by reading the (possibly stale, lazily-rebuilt) cached mesh.

use super::collision_data::{CollisionOutcome, EllipsoidTriangle, SweptCollision};
use crate::constants::{COLLISION_SAFETY_MARGIN, MAX_COLLISION_RECURSION};
use crate::world::grid::ChunkGrid;
use crate::world::mesh::{self, CellCorners};
use cgmath::{InnerSpace, Point3, Vector3};

const CORNER_OFFSETS: [(i32, i32, i32); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (1, 1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (1, 1, 1),
    (0, 1, 1),
];

/// Run one collision-resolver step: slide `position` along `velocity`
/// against the terrain, recursing up to `MAX_COLLISION_RECURSION` times.
pub fn step(grid: &ChunkGrid, position: Point3<f32>, velocity: Vector3<f32>, half_extents: Vector3<f32>) -> CollisionOutcome {
    resolve(grid, position, velocity, half_extents, MAX_COLLISION_RECURSION)
}

fn resolve(
    grid: &ChunkGrid,
    position: Point3<f32>,
    velocity: Vector3<f32>,
    half_extents: Vector3<f32>,
    recursion_budget: u32,
) -> CollisionOutcome {
    if velocity.magnitude2() < 1e-12 || recursion_budget == 0 {
        return CollisionOutcome::no_collision(position, velocity);
    }

    let e_position = to_ellipsoid_space(position, half_extents);
    let e_velocity = to_ellipsoid_vector(velocity, half_extents);
    let triangles = collect_candidate_triangles(grid, position, velocity, half_extents);

    let mut closest: Option<SweptCollision> = None;
    for triangle in &triangles {
        if let Some(collision) = sweep_sphere_vs_triangle(e_position, e_velocity, triangle) {
            if closest.map_or(true, |c| collision.travel_distance < c.travel_distance) {
                closest = Some(collision);
            }
        }
    }

    let Some(collision) = closest else {
        let new_position = position + velocity;
        return CollisionOutcome {
            position: new_position,
            velocity,
            contact_normal: Vector3::new(0.0, 1.0, 0.0),
            collided: false,
            in_air: true,
            under_terrain: false,
        };
    };

    if under_terrain(e_position, &collision) {
        let escape_normal = collision.normal;
        let escaped = from_ellipsoid_space(e_position + escape_normal * (1.0 + COLLISION_SAFETY_MARGIN), half_extents);
        return CollisionOutcome {
            position: escaped,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            contact_normal: from_ellipsoid_vector(escape_normal, half_extents).normalize(),
            collided: true,
            in_air: false,
            under_terrain: true,
        };
    }

    let travel = (collision.travel_distance - COLLISION_SAFETY_MARGIN).max(0.0);
    let new_e_position = e_position + e_velocity * (travel / e_velocity.magnitude().max(1e-6)).min(1.0);

    let slide_plane_origin = collision.contact_point;
    let slide_plane_normal = collision.normal;
    let destination_e = e_position + e_velocity;
    let distance_to_plane = (destination_e - slide_plane_origin).dot(slide_plane_normal);
    let new_destination_e = destination_e - slide_plane_normal * distance_to_plane;
    let slide_velocity_e = new_destination_e - collision.contact_point;

    let world_position = from_ellipsoid_space(new_e_position, half_extents);
    let world_slide_velocity = from_ellipsoid_vector(slide_velocity_e, half_extents);
    let world_normal = from_ellipsoid_vector(slide_plane_normal, half_extents).normalize();

    let recursed = resolve(grid, world_position, world_slide_velocity, half_extents, recursion_budget - 1);
    CollisionOutcome {
        collided: true,
        in_air: recursed.in_air && world_normal.y < 0.7,
        contact_normal: world_normal,
        ..recursed
    }
}

fn under_terrain(e_position: Point3<f32>, collision: &SweptCollision) -> bool {
    let to_center = e_position - collision.contact_point;
    to_center.dot(collision.normal) < -1.0
}

fn to_ellipsoid_space(point: Point3<f32>, half_extents: Vector3<f32>) -> Point3<f32> {
    Point3::new(point.x / half_extents.x, point.y / half_extents.y, point.z / half_extents.z)
}

fn to_ellipsoid_vector(v: Vector3<f32>, half_extents: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x / half_extents.x, v.y / half_extents.y, v.z / half_extents.z)
}

fn from_ellipsoid_space(point: Point3<f32>, half_extents: Vector3<f32>) -> Point3<f32> {
    Point3::new(point.x * half_extents.x, point.y * half_extents.y, point.z * half_extents.z)
}

fn from_ellipsoid_vector(v: Vector3<f32>, half_extents: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(v.x * half_extents.x, v.y * half_extents.y, v.z * half_extents.z)
}

/// Enumerate the lattice cells inside the world-space bounding cube of the
/// swept ellipsoid and triangulate each into candidate geometry.
fn collect_candidate_triangles(
    grid: &ChunkGrid,
    position: Point3<f32>,
    velocity: Vector3<f32>,
    half_extents: Vector3<f32>,
) -> Vec<EllipsoidTriangle> {
    let max_radius = half_extents.x.max(half_extents.y).max(half_extents.z);
    let sweep_end = position + velocity;

    let min_world = Point3::new(
        position.x.min(sweep_end.x) - max_radius,
        position.y.min(sweep_end.y) - max_radius,
        position.z.min(sweep_end.z) - max_radius,
    );
    let max_world = Point3::new(
        position.x.max(sweep_end.x) + max_radius,
        position.y.max(sweep_end.y) + max_radius,
        position.z.max(sweep_end.z) + max_radius,
    );

    let gx_min = grid.world_to_global_voxel_component(min_world.x) - 1;
    let gy_min = grid.world_to_global_voxel_component(min_world.y) - 1;
    let gz_min = grid.world_to_global_voxel_component(min_world.z) - 1;
    let gx_max = grid.world_to_global_voxel_component(max_world.x) + 1;
    let gy_max = grid.world_to_global_voxel_component(max_world.y) + 1;
    let gz_max = grid.world_to_global_voxel_component(max_world.z) + 1;

    let mut out = Vec::new();

    for gz in gz_min..gz_max {
        for gy in gy_min..gy_max {
            for gx in gx_min..gx_max {
                let Some(cell) = sample_cell(grid, gx, gy, gz) else {
                    continue;
                };
                let vertices = mesh::triangulate_cell(&cell, grid.surface_threshold);
                for tri in vertices.chunks_exact(3) {
                    out.push(EllipsoidTriangle {
                        a: to_ellipsoid_space(tri[0], half_extents),
                        b: to_ellipsoid_space(tri[1], half_extents),
                        c: to_ellipsoid_space(tri[2], half_extents),
                    });
                }
            }
        }
    }

    out
}

fn sample_cell(grid: &ChunkGrid, gx: i32, gy: i32, gz: i32) -> Option<CellCorners> {
    let mut densities = [crate::world::Density::EMPTY; 8];
    let mut positions = [Point3::new(0.0, 0.0, 0.0); 8];

    for (i, (ox, oy, oz)) in CORNER_OFFSETS.iter().enumerate() {
        let (cx, cy, cz) = (gx + ox, gy + oy, gz + oz);
        densities[i] = grid.density_at_global(cx, cy, cz)?;
        positions[i] = grid.global_voxel_world_position(cx, cy, cz);
    }

    Some(CellCorners { densities, positions })
}

/// Kasper Fauerby's swept-sphere-vs-triangle test: plane first, then edges
/// and vertices if the plane contact point falls outside the triangle.
/// Operates entirely in ellipsoid space (the sphere has unit radius there).
fn sweep_sphere_vs_triangle(center: Point3<f32>, velocity: Vector3<f32>, triangle: &EllipsoidTriangle) -> Option<SweptCollision> {
    let normal = triangle.normal();
    let velocity_dot_normal = velocity.dot(normal);

    let signed_distance = (center - triangle.a).dot(normal);

    let (t0, embedded) = if velocity_dot_normal.abs() < 1e-8 {
        if signed_distance.abs() >= 1.0 {
            return None;
        }
        (0.0, true)
    } else {
        let t0 = (1.0 - signed_distance) / velocity_dot_normal;
        let t1 = (-1.0 - signed_distance) / velocity_dot_normal;
        let (t0, t1) = (t0.min(t1), t0.max(t1));
        if t0 > 1.0 || t1 < 0.0 {
            return None;
        }
        (t0.clamp(0.0, 1.0), false)
    };

    if !embedded {
        let plane_point = center - normal + velocity * t0;
        if point_in_triangle(plane_point, triangle) {
            return Some(SweptCollision {
                travel_distance: t0 * velocity.magnitude(),
                contact_point: plane_point,
                normal,
            });
        }
    }

    // Plane contact missed the triangle (or the sphere started embedded):
    // fall back to vertex/edge sweep tests.
    let speed2 = velocity.magnitude2();
    let mut best_t = 1.0f32;
    let mut found = false;
    let mut contact = center;

    for vertex in [triangle.a, triangle.b, triangle.c] {
        if let Some(t) = sweep_sphere_vs_point(center, velocity, speed2, vertex) {
            if t < best_t {
                best_t = t;
                contact = vertex;
                found = true;
            }
        }
    }

    for (p0, p1) in [(triangle.a, triangle.b), (triangle.b, triangle.c), (triangle.c, triangle.a)] {
        if let Some((t, point)) = sweep_sphere_vs_edge(center, velocity, speed2, p0, p1) {
            if t < best_t {
                best_t = t;
                contact = point;
                found = true;
            }
        }
    }

    if !found {
        return None;
    }

    let contact_normal = (center + velocity * best_t - contact).normalize();
    Some(SweptCollision {
        travel_distance: best_t * velocity.magnitude(),
        contact_point: contact,
        normal: contact_normal,
    })
}

fn point_in_triangle(point: Point3<f32>, triangle: &EllipsoidTriangle) -> bool {
    let edge_test = |p0: Point3<f32>, p1: Point3<f32>| {
        let edge = p1 - p0;
        let to_point = point - p0;
        let n = triangle.normal();
        edge.cross(to_point).dot(n) >= 0.0
    };
    edge_test(triangle.a, triangle.b) && edge_test(triangle.b, triangle.c) && edge_test(triangle.c, triangle.a)
}

/// Smallest root in `[0, 1]` of `|center + t*velocity - point| = 1`, if any.
fn sweep_sphere_vs_point(center: Point3<f32>, velocity: Vector3<f32>, speed2: f32, point: Point3<f32>) -> Option<f32> {
    if speed2 < 1e-12 {
        return None;
    }
    let to_center = center - point;
    let a = speed2;
    let b = 2.0 * velocity.dot(to_center);
    let c = to_center.magnitude2() - 1.0;
    lowest_root(a, b, c, 1.0)
}

/// Smallest root where the swept sphere first touches segment `p0..p1`,
/// returning the parametric `t` and the touched point on the segment.
fn sweep_sphere_vs_edge(
    center: Point3<f32>,
    velocity: Vector3<f32>,
    speed2: f32,
    p0: Point3<f32>,
    p1: Point3<f32>,
) -> Option<(f32, Point3<f32>)> {
    let edge = p1 - p0;
    let edge_len2 = edge.magnitude2();
    if edge_len2 < 1e-12 {
        return None;
    }

    let to_center = p0 - center;
    let edge_dot_velocity = edge.dot(velocity);
    let edge_dot_to_center = edge.dot(to_center);

    let a = edge_len2 * -speed2 + edge_dot_velocity * edge_dot_velocity;
    let b = edge_len2 * 2.0 * velocity.dot(to_center) - 2.0 * edge_dot_velocity * edge_dot_to_center;
    let c = edge_len2 * (1.0 - to_center.magnitude2()) + edge_dot_to_center * edge_dot_to_center;

    let t = if a.abs() < 1e-8 {
        if b.abs() < 1e-8 {
            return None;
        }
        let candidate = -c / b;
        if (0.0..=1.0).contains(&candidate) {
            Some(candidate)
        } else {
            None
        }
    } else {
        lowest_root(-a, -b, -c, 1.0)
    }?;

    let f = (edge_dot_velocity * t - edge_dot_to_center) / edge_len2;
    if !(0.0..=1.0).contains(&f) {
        return None;
    }
    Some((t, p0 + edge * f))
}

/// Smallest non-negative root of `a*t^2 + b*t + c = 0` that's `<= max_t`.
fn lowest_root(a: f32, b: f32, c: f32, max_t: f32) -> Option<f32> {
    if a.abs() < 1e-10 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let r1 = (-b - sqrt_d) / (2.0 * a);
    let r2 = (-b + sqrt_d) / (2.0 * a);
    let (r1, r2) = (r1.min(r2), r1.max(r2));

    if r1 >= 0.0 && r1 <= max_t {
        Some(r1)
    } else if r2 >= 0.0 && r2 <= max_t {
        Some(r2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::ChunkCoord;

    fn flat_ground_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(3, 9.0, 60, false);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..3 {
                    grid.load_empty(ChunkCoord::new(x, y, z)).unwrap();
                }
            }
        }
        for z in 0..3 {
            for x in 0..3 {
                for lz in 0..16u32 {
                    for lx in 0..16u32 {
                        for ly in 0..4u32 {
                            grid.write_voxel(ChunkCoord::new(x, 0, z), crate::world::core::VoxelCoord::new(lx, ly, lz), crate::world::Density(200)).unwrap();
                        }
                        let _ = lz;
                        let _ = lx;
                    }
                }
            }
        }
        grid
    }

    #[test]
    fn falling_onto_flat_ground_collides() {
        let grid = flat_ground_grid();
        let half_extents = Vector3::new(1.0, 2.0, 1.0);
        // Ground top surface sits a bit below world origin's chunk(1) floor; drop from well above it.
        let start = Point3::new(0.0, 30.0, 0.0);
        let outcome = step(&grid, start, Vector3::new(0.0, -50.0, 0.0), half_extents);
        assert!(outcome.collided || outcome.position.y < start.y);
    }

    #[test]
    fn lowest_root_finds_smaller_nonnegative_root() {
        // t^2 - 3t + 2 = 0 -> roots 1, 2
        assert_eq!(lowest_root(1.0, -3.0, 2.0, 5.0), Some(1.0));
    }
}
