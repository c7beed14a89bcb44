//! Zenithal (azimuthal) projections: TAN, STG, ZEA and SIN.
//!
//! All four share the polar form `x = R sin(phi)`, `y = -R cos(phi)` and
//! differ only in the radial function `R(theta)`. The native reference point
//! is the native pole `(0, 90)`.

use super::{ProjectionId, SphericalProjection, R0};
use crate::geometry::DPoint;

fn from_polar(r: f64, phi: f64) -> DPoint {
    let (s, c) = phi.to_radians().sin_cos();
    DPoint::new(r * s, -r * c)
}

/// World plane point -> (phi degrees, radius).
fn to_polar(w: DPoint) -> (f64, f64) {
    let r = w.x.hypot(w.y);
    let phi = if r == 0.0 {
        0.0
    } else {
        w.x.atan2(-w.y).to_degrees()
    };
    (phi, r)
}

const ZENITHAL_REFERENCE: DPoint = DPoint { x: 0.0, y: 90.0 };

/// Gnomonic (TAN). Undefined on and below the native equator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gnomonic;

impl SphericalProjection for Gnomonic {
    fn id(&self) -> ProjectionId {
        ProjectionId::Gnomonic
    }

    fn native_reference(&self) -> DPoint {
        ZENITHAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        let (sin_t, cos_t) = native.y.to_radians().sin_cos();
        if sin_t <= 0.0 {
            return None;
        }
        Some(from_polar(R0 * cos_t / sin_t, native.x))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        let (phi, r) = to_polar(world);
        Some(DPoint::new(phi, R0.atan2(r).to_degrees()))
    }
}

/// Stereographic (STG). Singular at the native south pole.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stereographic;

impl SphericalProjection for Stereographic {
    fn id(&self) -> ProjectionId {
        ProjectionId::Stereographic
    }

    fn native_reference(&self) -> DPoint {
        ZENITHAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        let (sin_t, cos_t) = native.y.to_radians().sin_cos();
        let denom = 1.0 + sin_t;
        if denom < 1e-10 {
            return None;
        }
        Some(from_polar(2.0 * R0 * cos_t / denom, native.x))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        let (phi, r) = to_polar(world);
        let theta = 90.0 - 2.0 * (r / (2.0 * R0)).atan().to_degrees();
        Some(DPoint::new(phi, theta))
    }
}

/// Zenithal equal area (ZEA). The whole sphere maps into a disk of radius 2 R0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZenithalEqualArea;

impl SphericalProjection for ZenithalEqualArea {
    fn id(&self) -> ProjectionId {
        ProjectionId::ZenithalEqualArea
    }

    fn native_reference(&self) -> DPoint {
        ZENITHAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        let sin_t = native.y.to_radians().sin();
        let r = R0 * (2.0 * (1.0 - sin_t)).max(0.0).sqrt();
        Some(from_polar(r, native.x))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        let (phi, r) = to_polar(world);
        let rho = r / (2.0 * R0);
        if rho > 1.0 + 1e-12 {
            return None;
        }
        let theta = 90.0 - 2.0 * rho.min(1.0).asin().to_degrees();
        Some(DPoint::new(phi, theta))
    }
}

/// Orthographic (SIN) without the oblique PV terms. Only the visible
/// hemisphere `theta >= 0` projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orthographic;

impl SphericalProjection for Orthographic {
    fn id(&self) -> ProjectionId {
        ProjectionId::Orthographic
    }

    fn native_reference(&self) -> DPoint {
        ZENITHAL_REFERENCE
    }

    fn project(&self, native: DPoint) -> Option<DPoint> {
        if native.y < 0.0 {
            return None;
        }
        let cos_t = native.y.to_radians().cos();
        Some(from_polar(R0 * cos_t, native.x))
    }

    fn unproject(&self, world: DPoint) -> Option<DPoint> {
        let (phi, r) = to_polar(world);
        let rho = r / R0;
        if rho > 1.0 + 1e-12 {
            return None;
        }
        Some(DPoint::new(phi, rho.min(1.0).acos().to_degrees()))
    }
}
