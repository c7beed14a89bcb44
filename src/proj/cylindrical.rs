//! Cylindrical projections: plate carree (CAR) and Mercator (MER).
//!
//! The native reference point is `(0, 0)`. World x spans the native longitude
//! range `[-180, 180]`; points beyond it are outside the map.

use super::{ProjectionId, SphericalProjection, R0};
use crate::geometry::DPoint;

const CYLINDRICAL_REFERENCE: DPoint = DPoint { x: 0.0, y: 0.0 };

#[derive(Debug, Clone, Copy, Default)]
pub struct PlateCarree;

impl SphericalProjection for PlateCarree {
    fn id(&self) -> ProjectionId {
        ProjectionId::PlateCarree
    }

    fn native_reference(&self) -> DPoint {
        CYLINDRICAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        Some(native)
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        if world.x.abs() > 180.0 || world.y.abs() > 90.0 {
            return None;
        }
        Some(world)
    }
}

/// Mercator. Diverges at the native poles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercator;

impl SphericalProjection for Mercator {
    fn id(&self) -> ProjectionId {
        ProjectionId::Mercator
    }

    fn native_reference(&self) -> DPoint {
        CYLINDRICAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        if native.y.abs() >= 90.0 - 1e-10 {
            return None;
        }
        let y = R0 * (45.0 + native.y / 2.0).to_radians().tan().ln();
        Some(DPoint::new(native.x, y))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        if world.x.abs() > 180.0 {
            return None;
        }
        let theta = 2.0 * (world.y / R0).exp().atan().to_degrees() - 90.0;
        Some(DPoint::new(world.x, theta))
    }
}
