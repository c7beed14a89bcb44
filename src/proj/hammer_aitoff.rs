//! Hammer-Aitoff (AIT) equal area all-sky projection.

use super::{ProjectionId, SphericalProjection, R0};
use crate::geometry::DPoint;

#[derive(Debug, Clone, Copy, Default)]
pub struct HammerAitoff;

impl SphericalProjection for HammerAitoff {
    fn id(&self) -> ProjectionId {
        ProjectionId::HammerAitoff
    }

    fn native_reference(&self) -> DPoint {
        DPoint::new(0.0, 0.0)
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        let (sin_t, cos_t) = native.y.to_radians().sin_cos();
        let (sin_half_phi, cos_half_phi) = (native.x.to_radians() / 2.0).sin_cos();

        let gamma = (2.0 / (1.0 + cos_t * cos_half_phi)).sqrt();
        if !gamma.is_finite() {
            return None;
        }
        Some(DPoint::new(
            2.0 * R0 * gamma * cos_t * sin_half_phi,
            R0 * gamma * sin_t,
        ))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        let x = world.x / (4.0 * R0);
        let y = world.y / (2.0 * R0);
        let z2 = 1.0 - x * x - y * y;
        // Outside the bounding ellipse
        if z2 < 0.5 - 1e-12 {
            return None;
        }
        let z = z2.max(0.5).sqrt();

        let phi = 2.0 * (2.0 * z * x).atan2(2.0 * z * z - 1.0).to_degrees();
        let theta = (y * 2.0 * z).clamp(-1.0, 1.0).asin().to_degrees();
        Some(DPoint::new(phi, theta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_origin() {
        let w = HammerAitoff.project(DPoint::new(0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(w.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        for &(phi, theta) in &[(30.0, 20.0), (-150.0, -60.0), (179.0, 5.0), (0.0, 89.0)] {
            let w = HammerAitoff.project(DPoint::new(phi, theta)).unwrap();
            let n = HammerAitoff.unproject(w).unwrap();
            assert_abs_diff_eq!(n.x, phi, epsilon = 1e-9);
            assert_abs_diff_eq!(n.y, theta, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_outside_ellipse() {
        assert!(HammerAitoff.unproject(DPoint::new(3.0 * R0, 1.5 * R0)).is_none());
    }
}
