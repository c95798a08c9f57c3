//! Players and bullets (C6): kinematic simulation and the arena-backed
//! ephemeral bullet store.

pub mod bullet;
pub mod bullet_ops;
pub mod player;
pub mod player_ops;

pub use bullet::{BulletSlot, BulletStore};
pub use player::{NetworkRole, PlayerData};
