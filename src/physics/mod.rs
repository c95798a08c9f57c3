//! Ellipsoid-vs-terrain collision (C5).

pub mod collision;
pub mod collision_data;

pub use collision::step as resolve_collision;
pub use collision_data::CollisionOutcome;

/// Entity ID type, shared by players and bullets.
pub type EntityId = u32;
