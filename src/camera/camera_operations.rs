//! Third-person follow-camera operations — pure functions, no methods.

use super::camera_data::FollowCameraData;
use crate::world::core::Ray;
use crate::world::grid::ChunkGrid;
use cgmath::{InnerSpace, Point3, Vector3};

/// Desired (unoccluded) camera target: `p + s*u - distance*d + right*s`,
/// per spec.md §4.6.
pub fn follow_target(
    player_position: Point3<f32>,
    player_up: Vector3<f32>,
    player_direction: Vector3<f32>,
    player_size: f32,
    camera: &FollowCameraData,
) -> Point3<f32> {
    let right = player_direction.cross(player_up).normalize();
    player_position + player_up * player_size - player_direction * camera.distance + right * player_size
}

/// Pull the camera target in along the view ray if terrain would occlude
/// it, so geometry never clips between the camera and the player.
pub fn resolve_occlusion(grid: &ChunkGrid, player_position: Point3<f32>, desired_target: Point3<f32>) -> Point3<f32> {
    let offset = desired_target - player_position;
    let distance = offset.magnitude();
    if distance < 1e-6 {
        return desired_target;
    }

    let ray = Ray::new(player_position, offset);
    let step = grid.voxel_size * 0.5;
    let mut traveled = step;
    let mut clamped = distance;

    while traveled < distance {
        let point = ray.at(traveled);
        let (chunk, voxel) = grid.world_to_chunk_voxel(point);
        if chunk.in_bounds(grid.grid_edge) {
            if let Some(data) = grid.chunk(chunk) {
                if data.density(voxel.x, voxel.y, voxel.z).is_solid() {
                    clamped = (traveled - step).max(0.0);
                    break;
                }
            }
        }
        traveled += step;
    }

    player_position + ray.direction * clamped
}

/// Blend the camera's smoothed up vector toward the player's local up at
/// `up_blend_rate * dt` per step.
pub fn blend_up(camera: &mut FollowCameraData, target_up: Vector3<f32>, dt: f32) {
    let t = (camera.up_blend_rate * dt).clamp(0.0, 1.0);
    let blended = camera.up + (target_up - camera.up) * t;
    camera.up = if blended.magnitude2() > 1e-12 {
        blended.normalize()
    } else {
        target_up
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_up_moves_toward_target() {
        let mut camera = FollowCameraData::default();
        camera.up = Vector3::new(0.0, 1.0, 0.0);
        let target = Vector3::new(1.0, 0.0, 0.0);
        blend_up(&mut camera, target, 1.0 / 60.0);
        assert!(camera.up.x > 0.0);
        assert!(camera.up.y < 1.0);
    }

    #[test]
    fn follow_target_sits_behind_player() {
        let camera = FollowCameraData::default();
        let target = follow_target(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            &camera,
        );
        assert!(target.z < 0.0);
    }
}
