//! Third-person follow-camera data — pure data, no methods.

use cgmath::Vector3;

/// Configuration and smoothed state for the follow camera (spec.md §4.6).
/// Not replicated — purely a local presentation concern, but kept in the
/// same DOP shape (`*_data` + `*_operations`) as everything else here.
#[derive(Debug, Clone, Copy)]
pub struct FollowCameraData {
    /// Desired distance behind the player along `-direction`.
    pub distance: f32,
    /// Smoothed up vector, blended toward the player's local up each step.
    pub up: Vector3<f32>,
    /// Blend rate, per second, toward the player's local up.
    pub up_blend_rate: f32,
}

impl Default for FollowCameraData {
    fn default() -> Self {
        Self {
            distance: 12.0,
            up: Vector3::new(0.0, 1.0, 0.0),
            up_blend_rate: crate::constants::CAMERA_UP_BLEND_RATE,
        }
    }
}
