//! Third-person follow camera (part of C6). DOP split: `camera_data` is
//! plain data, `camera_operations` is pure functions over it.

pub mod camera_data;
pub mod camera_operations;

pub use camera_data::FollowCameraData;
pub use camera_operations::{blend_up, follow_target, resolve_occlusion};
