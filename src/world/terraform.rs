//! Terrain edit engine (C4): the terraform primitive, ray-cast terraform,
//! and the sphere/hollow-sphere/plane construction primitives spec.md §4.2
//! describes. All of these are pure functions over a [`ChunkGrid`] — no
//! terraform "tool" object, just data in and chunk writes out, the same
//! shape as `chunk_ops.rs`.

use super::core::voxel::Density;
use super::core::{ChunkCoord, Ray, VoxelCoord};
use super::grid::ChunkGrid;
use crate::constants::CHUNK_EDGE;
use cgmath::Point3;

/// Apply the terraform primitive: every voxel within Euclidean radius
/// `radius` (in voxels) of `center` has its density changed by
/// `±(1 - d^2/r^2) * speed * dt`, clamped to `[0, MAX_VOXEL_DENSITY]`.
/// Returns the number of voxels actually written (voxels outside a loaded
/// chunk are skipped, per the chunk-out-of-bounds error-handling rule in
/// spec.md §7).
pub fn terraform_primitive(
    grid: &mut ChunkGrid,
    center: Point3<f32>,
    radius: i32,
    destructive: bool,
    dt: f32,
    speed: f32,
) -> usize {
    let r2 = (radius * radius) as f32;
    let (cxs, cys, czs) = voxel_space_center(grid, center);
    let mut written = 0;

    for dz in -radius..=radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = (dx * dx + dy * dy + dz * dz) as f32;
                if d2 > r2 {
                    continue;
                }

                let magnitude = (1.0 - d2 / r2) * speed * dt;
                let signed = if destructive { -magnitude } else { magnitude };

                let gx = cxs + dx as f32;
                let gy = cys + dy as f32;
                let gz = czs + dz as f32;

                if write_delta_at_voxel_space(grid, gx, gy, gz, signed) {
                    written += 1;
                }
            }
        }
    }

    written
}

/// Step along `ray` in `max_reach / 10` increments until the first solid
/// voxel is found, then apply the terraform primitive centered there.
/// Returns `false` if no solid voxel was hit within `max_reach`.
pub fn ray_cast_terraform(
    grid: &mut ChunkGrid,
    ray: &Ray,
    max_reach: f32,
    radius: i32,
    destructive: bool,
    dt: f32,
    speed: f32,
) -> bool {
    let step = max_reach / 10.0;
    let mut distance = step;

    while distance <= max_reach {
        let point = ray.at(distance);
        let (chunk, voxel) = grid.world_to_chunk_voxel(point);
        if chunk.in_bounds(grid.grid_edge) {
            if let Some(data) = grid.chunk(chunk) {
                if data.density(voxel.x, voxel.y, voxel.z).is_solid() {
                    terraform_primitive(grid, point, radius, destructive, dt, speed);
                    return true;
                }
            }
        }
        distance += step;
    }

    false
}

/// Carve a destructive explosion sphere of `radius` voxels, instantaneous
/// (a single tick's worth of terraform at very high speed) — used for
/// bullet impacts (spec.md §4.6, Concrete Scenario 6).
pub fn explode(grid: &mut ChunkGrid, center: Point3<f32>, radius: i32) -> usize {
    terraform_primitive(grid, center, radius, true, 1.0, crate::constants::MAX_VOXEL_DENSITY as f32)
}

/// One-shot solid sphere, density proportional to `1 - d^2/r^2`, scaled by
/// `peak_density`. Used for world construction, not real-time terraform —
/// there is no `dt`/`speed`, the write is absolute rather than additive.
pub fn construct_sphere(grid: &mut ChunkGrid, center: Point3<f32>, radius: i32, peak_density: u8) {
    let r2 = (radius * radius) as f32;
    let (cxs, cys, czs) = voxel_space_center(grid, center);

    for dz in -radius..=radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = (dx * dx + dy * dy + dz * dz) as f32;
                if d2 > r2 {
                    continue;
                }
                let density = Density::saturate((1.0 - d2 / r2) * peak_density as f32);
                set_voxel_space(grid, cxs + dx as f32, cys + dy as f32, czs + dz as f32, density);
            }
        }
    }
}

/// One-shot hollow shell: only voxels within `shell_thickness` of the
/// sphere's surface (`|d - radius| <= shell_thickness`) are written.
pub fn construct_hollow_sphere(
    grid: &mut ChunkGrid,
    center: Point3<f32>,
    radius: i32,
    shell_thickness: f32,
    peak_density: u8,
) {
    let (cxs, cys, czs) = voxel_space_center(grid, center);

    for dz in -radius..=radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = ((dx * dx + dy * dy + dz * dz) as f32).sqrt();
                if (d - radius as f32).abs() > shell_thickness {
                    continue;
                }
                set_voxel_space(grid, cxs + dx as f32, cys + dy as f32, czs + dz as f32, Density(peak_density));
            }
        }
    }
}

/// One-shot flat slab centered on world-space height `y`, `thickness`
/// voxels tall, spanning the full x/z extent of the grid.
pub fn construct_plane(grid: &mut ChunkGrid, y: f32, thickness: f32, density: u8) {
    let half = thickness / 2.0;
    let grid_edge = grid.grid_edge;
    let span = (grid_edge * CHUNK_EDGE) as i32;
    let half_span = span / 2;

    let ys = super::core::world_to_voxel_space(y, grid.grid_edge, CHUNK_EDGE, grid.voxel_size);
    let half_voxels = (half / grid.voxel_size).round() as i32;

    for dy in -half_voxels..=half_voxels {
        for gx in -half_span..half_span {
            for gz in -half_span..half_span {
                set_voxel_space(grid, gx as f32, ys + dy as f32, gz as f32, Density(density));
            }
        }
    }
}

fn voxel_space_center(grid: &ChunkGrid, center: Point3<f32>) -> (f32, f32, f32) {
    (
        super::core::world_to_voxel_space(center.x, grid.grid_edge, CHUNK_EDGE, grid.voxel_size),
        super::core::world_to_voxel_space(center.y, grid.grid_edge, CHUNK_EDGE, grid.voxel_size),
        super::core::world_to_voxel_space(center.z, grid.grid_edge, CHUNK_EDGE, grid.voxel_size),
    )
}

fn resolve_voxel_space(grid: &ChunkGrid, xs: f32, ys: f32, zs: f32) -> Option<(ChunkCoord, VoxelCoord)> {
    let chunk = ChunkCoord::new(
        super::core::voxel_space_to_chunk_component(xs, CHUNK_EDGE),
        super::core::voxel_space_to_chunk_component(ys, CHUNK_EDGE),
        super::core::voxel_space_to_chunk_component(zs, CHUNK_EDGE),
    );
    if !chunk.in_bounds(grid.grid_edge) || !grid.is_loaded(chunk) {
        return None;
    }
    let voxel = VoxelCoord::new(
        super::core::voxel_space_to_local_component(xs, CHUNK_EDGE),
        super::core::voxel_space_to_local_component(ys, CHUNK_EDGE),
        super::core::voxel_space_to_local_component(zs, CHUNK_EDGE),
    );
    Some((chunk, voxel))
}

fn write_delta_at_voxel_space(grid: &mut ChunkGrid, xs: f32, ys: f32, zs: f32, delta: f32) -> bool {
    let Some((chunk, voxel)) = resolve_voxel_space(grid, xs, ys, zs) else {
        return false;
    };
    let current = grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z).as_f32();
    let new_density = Density::saturate(current + delta);
    grid.write_voxel(chunk, voxel, new_density).is_ok()
}

fn set_voxel_space(grid: &mut ChunkGrid, xs: f32, ys: f32, zs: f32, density: Density) -> bool {
    let Some((chunk, voxel)) = resolve_voxel_space(grid, xs, ys, zs) else {
        return false;
    };
    grid.write_voxel(chunk, voxel, density).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn make_grid() -> ChunkGrid {
        let mut grid = ChunkGrid::new(5, 9.0, 60, true);
        for z in 0..5 {
            for y in 0..5 {
                for x in 0..5 {
                    grid.load_empty(ChunkCoord::new(x, y, z)).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn terraform_primitive_stays_within_radius() {
        let mut grid = make_grid();
        let center = Point3::new(0.0, 0.0, 0.0);
        terraform_primitive(&mut grid, center, 2, false, 1.0, 300.0);

        let (cxs, cys, czs) = voxel_space_center(&grid, center);
        for dz in -4..=4 {
            for dy in -4..=4 {
                for dx in -4..=4 {
                    let d2 = (dx * dx + dy * dy + dz * dz) as f32;
                    if d2 <= 4.0 {
                        continue;
                    }
                    if let Some((chunk, voxel)) =
                        resolve_voxel_space(&grid, cxs + dx as f32, cys + dy as f32, czs + dz as f32)
                    {
                        assert_eq!(grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z), Density::EMPTY);
                    }
                }
            }
        }
    }

    #[test]
    fn terraform_primitive_never_produces_sentinel() {
        let mut grid = make_grid();
        for _ in 0..50 {
            terraform_primitive(&mut grid, Point3::new(0.0, 0.0, 0.0), 3, false, 1.0, 10_000.0);
        }
        let (cxs, cys, czs) = voxel_space_center(&grid, Point3::new(0.0, 0.0, 0.0));
        let (chunk, voxel) = resolve_voxel_space(&grid, cxs, cys, czs).unwrap();
        assert_ne!(grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z), Density::SENTINEL);
    }

    #[test]
    fn ray_cast_terraform_hits_solid_voxel() {
        let mut grid = make_grid();
        construct_sphere(&mut grid, Point3::new(0.0, 0.0, 0.0), 3, 200);

        let ray = Ray::new(Point3::new(0.0, 0.0, -100.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = ray_cast_terraform(&mut grid, &ray, 200.0, 2, true, 1.0 / 60.0, 300.0);
        assert!(hit);
    }

    #[test]
    fn explode_carves_a_destructive_sphere() {
        let mut grid = make_grid();
        let center = Point3::new(0.0, 0.0, 0.0);
        construct_sphere(&mut grid, center, 3, 200);
        let (cxs, cys, czs) = voxel_space_center(&grid, center);
        let (chunk, voxel) = resolve_voxel_space(&grid, cxs, cys, czs).unwrap();

        let before = grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z);
        explode(&mut grid, center, 2);
        let after = grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z);
        assert!(after.0 <= before.0);
    }
}
