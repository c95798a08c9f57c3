//! Prediction-divergence checks (C9), per spec.md §4.3's server-comparison
//! step. Not an error path — divergence is an ordinary outcome handled by
//! the reconciliation protocol, not `NetError`.

use crate::world::Density;
use cgmath::{Point3, Vector3};

/// True if the client's claimed final position differs from the server's
/// simulated position by more than `epsilon` along any axis.
pub fn position_diverges(claimed: Point3<f32>, authoritative: Point3<f32>, epsilon: f32) -> bool {
    let delta = claimed - authoritative;
    delta.x.abs() > epsilon || delta.y.abs() > epsilon || delta.z.abs() > epsilon
}

/// True if the client's claimed final direction differs from the server's
/// by more than `epsilon` along any axis.
pub fn direction_diverges(claimed: Vector3<f32>, authoritative: Vector3<f32>, epsilon: f32) -> bool {
    let delta = claimed - authoritative;
    delta.x.abs() > epsilon || delta.y.abs() > epsilon || delta.z.abs() > epsilon
}

/// Wire value for one claimed voxel edit: `SENTINEL` if the server agrees
/// with the client's claimed density, otherwise the server's own value
/// (and the caller must set `need_voxel_correction`), per spec.md §4.3.
pub fn voxel_wire_value(claimed: Density, authoritative: Density) -> Density {
    if claimed == authoritative {
        Density::SENTINEL
    } else {
        authoritative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_within_epsilon_does_not_diverge() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.05, 0.0, 0.0);
        assert!(!position_diverges(a, b, 0.1));
    }

    #[test]
    fn position_beyond_epsilon_diverges() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.15, 0.0);
        assert!(position_diverges(a, b, 0.1));
    }

    #[test]
    fn matching_voxel_claim_returns_sentinel() {
        assert_eq!(voxel_wire_value(Density(80), Density(80)), Density::SENTINEL);
        assert_eq!(voxel_wire_value(Density(120), Density(80)), Density(80));
    }
}
