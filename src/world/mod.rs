//! Voxel terrain: chunk storage, marching-cubes mesh derivation, and the
//! terraform edit engine (C3, C4).

pub mod chunk;
pub mod chunk_ops;
pub mod core;
pub mod grid;
pub mod mesh;
pub mod terraform;

pub use chunk::{ChunkData, ChunkHistory};
pub use core::voxel::Density;
pub use core::{ChunkCoord, Ray, VoxelCoord};
pub use grid::ChunkGrid;
