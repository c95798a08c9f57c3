//! Voxel density — pure data, no methods.
//!
//! Mirrors the `BlockId` newtype pattern from the block registry this
//! engine grew out of (a `#[repr(transparent)]` wrapper that's `Pod` so it
//! can sit directly in a flat chunk buffer), but a `Density` carries no
//! identity beyond its numeric value: the surface is wherever density
//! crosses [`crate::constants::SURFACE_THRESHOLD`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Density of a single voxel. Values above the surface threshold are solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Density(pub u8);

unsafe impl bytemuck::Pod for Density {}
unsafe impl bytemuck::Zeroable for Density {}

impl Default for Density {
    fn default() -> Self {
        Density::EMPTY
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Density {
    pub const EMPTY: Density = Density(0);
    pub const SATURATED: Density = Density(crate::constants::MAX_VOXEL_DENSITY);

    /// Marker value meaning "client prediction was correct" in a wire
    /// voxel-correction entry. Never a legal stored density — see
    /// [`Density::saturate`].
    pub const SENTINEL: Density = Density(crate::constants::VOXEL_SENTINEL);

    #[inline]
    pub fn is_solid(self) -> bool {
        self.0 > crate::constants::SURFACE_THRESHOLD
    }

    /// Clamp to `[0, MAX_VOXEL_DENSITY]`, keeping `SENTINEL` (255) reserved
    /// for the wire protocol as spec.md §4.2/§9 requires.
    #[inline]
    pub fn saturate(value: f32) -> Density {
        Density(value.round().clamp(0.0, crate::constants::MAX_VOXEL_DENSITY as f32) as u8)
    }

    #[inline]
    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_threshold_boundary() {
        assert!(!Density(60).is_solid());
        assert!(Density(61).is_solid());
    }

    #[test]
    fn saturate_never_produces_sentinel() {
        assert_eq!(Density::saturate(1000.0), Density::SATURATED);
        assert_ne!(Density::saturate(1000.0), Density::SENTINEL);
        assert_eq!(Density::saturate(-5.0), Density(0));
    }
}
