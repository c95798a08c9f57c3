//! Bullet lifecycle operations — pure functions over [`BulletStore`].

use super::bullet::{BulletSlot, BulletStore};
use crate::constants::{BULLET_EXPLOSION_RADIUS, GRAVITY};
use crate::physics;
use crate::world::{grid::ChunkGrid, terraform};
use cgmath::{Point3, Vector3};

/// Allocate a bullet in a free slot if one exists, otherwise grow the
/// arena. Returns the slot index.
pub fn spawn(store: &mut BulletStore, position: Point3<f32>, velocity: Vector3<f32>, size: f32, up: Vector3<f32>, owner: u32) -> usize {
    let slot = BulletSlot {
        position,
        velocity,
        size,
        up,
        burnable: true,
        owner,
        dead: false,
    };

    if let Some(index) = store.free_list.pop() {
        store.slots[index] = slot;
        index
    } else {
        store.slots.push(slot);
        store.slots.len() - 1
    }
}

/// Mark a slot dead and return it to the free list. O(1), no compaction.
pub fn despawn(store: &mut BulletStore, index: usize) {
    if let Some(slot) = store.slots.get_mut(index) {
        if !slot.dead {
            slot.dead = true;
            store.free_list.push(index);
        }
    }
}

/// Outcome of stepping one bullet, reported back to the caller so it can
/// trigger a particle/explosion effect on the rendering side (spec.md §6).
pub struct BulletImpact {
    pub index: usize,
    pub position: Point3<f32>,
    pub owner: u32,
}

/// Advance every alive bullet by `dt`: integrate gravity and velocity,
/// resolve collision against the terrain, and on first impact despawn the
/// bullet and carve a destructive sphere of radius
/// [`BULLET_EXPLOSION_RADIUS`] (spec.md §3, §4.6, Concrete Scenario 6).
/// Bullets that leave the chunk grid entirely are also despawned.
pub fn step_all(store: &mut BulletStore, grid: &mut ChunkGrid, dt: f32) -> Vec<BulletImpact> {
    let mut impacts = Vec::new();
    let alive: Vec<usize> = store.iter_alive().map(|(i, _)| i).collect();

    for index in alive {
        let slot = store.slots[index];
        let velocity = slot.velocity - slot.up * GRAVITY * dt;
        let half_extents = Vector3::new(slot.size, slot.size, slot.size);
        let outcome = physics::resolve_collision(grid, slot.position, velocity, half_extents);

        let (chunk, _) = grid.world_to_chunk_voxel(outcome.position);
        let left_grid = !chunk.in_bounds(grid.grid_edge);

        if outcome.collided || left_grid {
            if outcome.collided {
                terraform::explode(grid, outcome.position, BULLET_EXPLOSION_RADIUS);
                impacts.push(BulletImpact {
                    index,
                    position: outcome.position,
                    owner: slot.owner,
                });
            }
            despawn(store, index);
        } else {
            store.slots[index].position = outcome.position;
            store.slots[index].velocity = outcome.velocity;
        }
    }

    impacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::{ChunkCoord, VoxelCoord};
    use crate::world::Density;

    /// A wall of solid voxels filling chunk (1,0,0), the rest of a 3x1x1
    /// row of chunks left empty so a bullet travelling +x crosses open
    /// space before hitting it (Concrete Scenario 6).
    fn grid_with_wall() -> ChunkGrid {
        let mut grid = ChunkGrid::new(3, 9.0, 60, true);
        for x in 0..3 {
            grid.load_empty(ChunkCoord::new(x, 0, 0)).unwrap();
        }
        for lz in 0..16u32 {
            for ly in 0..16u32 {
                for lx in 0..16u32 {
                    grid.write_voxel(ChunkCoord::new(1, 0, 0), VoxelCoord::new(lx, ly, lz), Density(200)).unwrap();
                }
            }
        }
        grid
    }

    #[test]
    fn bullet_impact_despawns_and_carves_destructive_sphere() {
        let mut grid = grid_with_wall();
        let mut store = BulletStore::new();
        let start = grid.voxel_world_position(ChunkCoord::new(0, 0, 0), 1.0, 8.0, 8.0);
        let index = spawn(&mut store, start, Vector3::new(200.0, 0.0, 0.0), 0.5, Vector3::new(0.0, 1.0, 0.0), 7);

        let mut impacts = Vec::new();
        for _ in 0..200 {
            impacts = step_all(&mut store, &mut grid, 1.0 / 60.0);
            if !impacts.is_empty() || store.slots[index].dead {
                break;
            }
        }

        assert!(store.slots[index].dead);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].owner, 7);

        let (chunk, voxel) = grid.world_to_chunk_voxel(impacts[0].position);
        let density = grid.chunk(chunk).unwrap().density(voxel.x, voxel.y, voxel.z);
        assert!(density.0 < 200, "explosion should have carved density down from the solid wall value");
    }
}
