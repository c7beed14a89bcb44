//! Celestial map projections.
//!
//! A [`Projection`] maps celestial coordinates (RA, Dec) to world plane
//! coordinates in two steps: a [`SphericalRotation`] to native spherical
//! coordinates, then the closed-form relation of one of seven FITS-WCS
//! projection families. Angles and world coordinates are in degrees.

pub mod cylindrical;
pub mod factory;
pub mod hammer_aitoff;
pub mod rotation;
pub mod wcs;
pub mod zenithal;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ProjError;
use crate::geometry::DPoint;

pub use factory::ProjectionFactory;
pub use rotation::SphericalRotation;
pub use wcs::WcsKeywords;

/// Radians to degrees; the radius of the generating sphere in world units.
pub const R0: f64 = 180.0 / std::f64::consts::PI;

/// Native-space distance above which two points are considered to sit on
/// opposite sides of a projection discontinuity.
pub const BROKEN_LINE_THRESHOLD: f64 = 150.0;

/// The closed set of supported projection families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionId {
    Gnomonic,
    Stereographic,
    PlateCarree,
    Mercator,
    HammerAitoff,
    ZenithalEqualArea,
    Orthographic,
}

impl ProjectionId {
    pub const ALL: [ProjectionId; 7] = [
        ProjectionId::Gnomonic,
        ProjectionId::Stereographic,
        ProjectionId::PlateCarree,
        ProjectionId::Mercator,
        ProjectionId::HammerAitoff,
        ProjectionId::ZenithalEqualArea,
        ProjectionId::Orthographic,
    ];

    /// Three-letter FITS WCS projection code.
    pub fn wcs_code(&self) -> &'static str {
        match self {
            Self::Gnomonic => "TAN",
            Self::Stereographic => "STG",
            Self::PlateCarree => "CAR",
            Self::Mercator => "MER",
            Self::HammerAitoff => "AIT",
            Self::ZenithalEqualArea => "ZEA",
            Self::Orthographic => "SIN",
        }
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Gnomonic => "Gnomonic",
            Self::Stereographic => "Stereographic",
            Self::PlateCarree => "PlateCarree",
            Self::Mercator => "Mercator",
            Self::HammerAitoff => "HammerAitoff",
            Self::ZenithalEqualArea => "ZenithalEqualArea",
            Self::Orthographic => "Orthographic",
        }
    }

    /// Lookup by WCS code, trimmed and case-insensitive.
    pub fn from_wcs_code(code: &str) -> Result<Self, ProjError> {
        let key = code.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.wcs_code().eq_ignore_ascii_case(key))
            .ok_or_else(|| ProjError::UnknownCode(code.to_string()))
    }

    /// Lookup by identifier, trimmed and case-insensitive.
    pub fn from_identifier(identifier: &str) -> Result<Self, ProjError> {
        let key = identifier.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.identifier().eq_ignore_ascii_case(key))
            .ok_or_else(|| ProjError::UnknownIdentifier(identifier.to_string()))
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ProjectionId {
    type Err = ProjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).or_else(|_| Self::from_wcs_code(s))
    }
}

pub fn wcs_code_to_projection_identifier(code: &str) -> Result<&'static str, ProjError> {
    ProjectionId::from_wcs_code(code).map(|id| id.identifier())
}

pub fn projection_identifier_to_wcs_code(identifier: &str) -> Result<&'static str, ProjError> {
    ProjectionId::from_identifier(identifier).map(|id| id.wcs_code())
}

/// Native spherical <-> world plane relation of one projection family.
///
/// `native` points are `(phi, theta)` in degrees; `None` means the point lies
/// outside the family's domain.
pub trait SphericalProjection: Send + Sync + fmt::Debug {
    fn id(&self) -> ProjectionId;

    /// Native coordinates `(phi0, theta0)` of the reference point.
    fn native_reference(&self) -> DPoint;

    fn project(&self, native: DPoint) -> Option<DPoint>;

    fn unproject(&self, world: DPoint) -> Option<DPoint>;
}

/// A projection family bound to a celestial reference point.
///
/// Built once through [`Projection::from_ref_point`] or
/// [`Projection::from_wcs`] and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Projection {
    family: Arc<dyn SphericalProjection>,
    ra0: f64,
    dec0: f64,
    phi0: f64,
    theta0: f64,
    lonpole: f64,
    latpole: f64,
    rotation: SphericalRotation,
}

impl Projection {
    /// Bind `family` to the celestial reference point `(ra, dec)` in degrees,
    /// with default pole angles.
    pub fn from_ref_point(
        family: Arc<dyn SphericalProjection>,
        ra: f64,
        dec: f64,
    ) -> Result<Self, ProjError> {
        let native = family.native_reference();
        Self::build(family, ra, dec, native.x, native.y, None, None)
    }

    /// Bind `family` using CRVAL, LONPOLE, LATPOLE and PV1_1/PV1_2 (native
    /// reference override) from a WCS keyword set.
    pub fn from_wcs(family: Arc<dyn SphericalProjection>, wcs: &WcsKeywords) -> Result<Self, ProjError> {
        let (ra, dec) = wcs.reference_point()?;
        let native = family.native_reference();
        let phi0 = wcs.pv1_1.unwrap_or(native.x);
        let theta0 = wcs.pv1_2.unwrap_or(native.y);
        Self::build(family, ra, dec, phi0, theta0, wcs.lonpole, wcs.latpole)
    }

    fn build(
        family: Arc<dyn SphericalProjection>,
        ra: f64,
        dec: f64,
        phi0: f64,
        theta0: f64,
        lonpole: Option<f64>,
        latpole: Option<f64>,
    ) -> Result<Self, ProjError> {
        let rotation = SphericalRotation::from_reference(ra, dec, phi0, theta0, lonpole, latpole)?;
        let ra = rotation::normalize_ra(ra);
        Ok(Self {
            family,
            ra0: ra.to_radians(),
            dec0: dec.to_radians(),
            phi0,
            theta0,
            lonpole: rotation.phi_p(),
            latpole: rotation.native_pole().y,
            rotation,
        })
    }

    /// Celestial -> world. `None` for non-finite intermediates or points
    /// outside the projection domain.
    pub fn direct(&self, celestial: DPoint) -> Option<DPoint> {
        if !celestial.is_finite() {
            return None;
        }
        let native = self.rotation.celestial_to_native(celestial);
        if !native.is_finite() {
            return None;
        }
        self.family.project(native).filter(DPoint::is_finite)
    }

    /// World -> celestial, failing symmetrically to [`Projection::direct`].
    pub fn inverse(&self, world: DPoint) -> Option<DPoint> {
        if !world.is_finite() {
            return None;
        }
        let native = self.family.unproject(world).filter(DPoint::is_finite)?;
        Some(self.rotation.native_to_celestial(native)).filter(DPoint::is_finite)
    }

    /// True when the segment between two celestial points does not cross a
    /// discontinuity of the native coordinate system.
    pub fn check_broken_line(&self, cp1: DPoint, cp2: DPoint) -> bool {
        let n1 = self.rotation.celestial_to_native(cp1);
        let n2 = self.rotation.celestial_to_native(cp2);
        n1.is_finite() && n2.is_finite() && n1.distance_to(n2) < BROKEN_LINE_THRESHOLD
    }

    /// Great-circle distance in degrees (Vincenty form, stable everywhere).
    pub fn distance(p1: DPoint, p2: DPoint) -> f64 {
        let (sin_d1, cos_d1) = p1.y.to_radians().sin_cos();
        let (sin_d2, cos_d2) = p2.y.to_radians().sin_cos();
        let (sin_da, cos_da) = (p2.x - p1.x).to_radians().sin_cos();

        let a = cos_d2 * sin_da;
        let b = cos_d1 * sin_d2 - sin_d1 * cos_d2 * cos_da;
        let num = a.hypot(b);
        let den = sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_da;
        num.atan2(den).to_degrees()
    }

    /// Great-circle distance in degrees by the spherical law of cosines.
    ///
    /// Accurate to 1e-5 degrees. Near 0 and 180 degrees the cosine saturates,
    /// so separations below about 1e-6 degrees are not resolved.
    pub fn distance_fast(p1: DPoint, p2: DPoint) -> f64 {
        let (sin_d1, cos_d1) = p1.y.to_radians().sin_cos();
        let (sin_d2, cos_d2) = p2.y.to_radians().sin_cos();
        let cos_da = (p2.x - p1.x).to_radians().cos();
        (sin_d1 * sin_d2 + cos_d1 * cos_d2 * cos_da)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    }

    /// `[ra0, dec0]` in degrees.
    pub fn reference_celestial_coordinates(&self) -> [f64; 2] {
        [self.ra0(), self.dec0()]
    }

    /// `[phi0, theta0]` in degrees.
    pub fn reference_native_coordinates(&self) -> [f64; 2] {
        [self.phi0, self.theta0]
    }

    /// `[lonpole, latpole]` in degrees, resolved at construction.
    pub fn celestial_pole_native_coordinates(&self) -> [f64; 2] {
        [self.lonpole, self.latpole]
    }

    pub fn ra0(&self) -> f64 {
        self.ra0.to_degrees()
    }

    pub fn dec0(&self) -> f64 {
        self.dec0.to_degrees()
    }

    pub fn id(&self) -> ProjectionId {
        self.family.id()
    }

    pub fn proj_code(&self) -> &'static str {
        self.id().wcs_code()
    }

    pub fn identifier(&self) -> &'static str {
        self.id().identifier()
    }

    pub fn rotation(&self) -> &SphericalRotation {
        &self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn projection(id: ProjectionId, ra: f64, dec: f64) -> Projection {
        ProjectionFactory::create_by_identifier(id.identifier(), ra, dec).unwrap()
    }

    #[test]
    fn test_code_maps_are_inverse() {
        for id in ProjectionId::ALL {
            let ident = wcs_code_to_projection_identifier(id.wcs_code()).unwrap();
            assert_eq!(ident, id.identifier());
            assert_eq!(projection_identifier_to_wcs_code(ident).unwrap(), id.wcs_code());
        }
        assert_eq!(
            wcs_code_to_projection_identifier("XYZ"),
            Err(ProjError::UnknownCode("XYZ".into()))
        );
        assert!(projection_identifier_to_wcs_code("XYZ").is_err());
        assert_eq!(wcs_code_to_projection_identifier(" tan ").unwrap(), "Gnomonic");
        assert_eq!("mercator".parse::<ProjectionId>().unwrap(), ProjectionId::Mercator);
    }

    #[test]
    fn test_reference_point_maps_to_world_origin() {
        for id in ProjectionId::ALL {
            let p = projection(id, 120.0, 35.0);
            let w = p.direct(DPoint::new(120.0, 35.0)).unwrap();
            assert_abs_diff_eq!(w.x, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(w.y, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_direct_inverse_roundtrip_all_families() {
        let points = [
            (120.0, 35.0),
            (125.0, 38.0),
            (112.5, 30.0),
            (130.0, 45.0),
            (118.0, 20.0),
        ];
        for id in ProjectionId::ALL {
            let p = projection(id, 120.0, 35.0);
            for &(ra, dec) in &points {
                let w = p.direct(DPoint::new(ra, dec)).unwrap();
                let c = p.inverse(w).unwrap();
                assert_abs_diff_eq!(c.x, ra, epsilon = 1e-9);
                assert_abs_diff_eq!(c.y, dec, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_roundtrip_across_ra_zero() {
        let p = projection(ProjectionId::Gnomonic, 0.5, -10.0);
        let w = p.direct(DPoint::new(359.0, -11.0)).unwrap();
        let c = p.inverse(w).unwrap();
        assert_abs_diff_eq!(c.x, 359.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, -11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_direct_fails_outside_domain() {
        // Antipode of the reference point
        let antipode = DPoint::new(300.0, -35.0);
        assert!(projection(ProjectionId::Gnomonic, 120.0, 35.0).direct(antipode).is_none());
        assert!(projection(ProjectionId::Stereographic, 120.0, 35.0).direct(antipode).is_none());
        assert!(projection(ProjectionId::Orthographic, 120.0, 35.0).direct(antipode).is_none());
        // Native pole of a cylindrical projection
        assert!(projection(ProjectionId::Mercator, 0.0, 0.0)
            .direct(DPoint::new(0.0, 90.0))
            .is_none());
        // Non-finite input
        assert!(projection(ProjectionId::PlateCarree, 0.0, 0.0)
            .direct(DPoint::new(f64::NAN, 0.0))
            .is_none());
    }

    #[test]
    fn test_inverse_fails_off_map() {
        let ait = projection(ProjectionId::HammerAitoff, 0.0, 0.0);
        assert!(ait.inverse(DPoint::new(400.0, 0.0)).is_none());
        let sin = projection(ProjectionId::Orthographic, 0.0, 0.0);
        assert!(sin.inverse(DPoint::new(R0 * 2.0, 0.0)).is_none());
        assert!(sin.inverse(DPoint::new(f64::INFINITY, 0.0)).is_none());
    }

    #[test]
    fn test_accessors() {
        let p = projection(ProjectionId::Gnomonic, 370.0, 35.0);
        assert_abs_diff_eq!(p.reference_celestial_coordinates()[0], 10.0, epsilon = 1e-12);
        assert_eq!(p.reference_native_coordinates(), [0.0, 90.0]);
        let pole = p.celestial_pole_native_coordinates();
        assert_abs_diff_eq!(pole[0], 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pole[1], 35.0, epsilon = 1e-12);

        let car = projection(ProjectionId::PlateCarree, 10.0, -20.0);
        assert_eq!(car.reference_native_coordinates(), [0.0, 0.0]);
        assert_abs_diff_eq!(car.celestial_pole_native_coordinates()[0], 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_properties() {
        let pairs = [
            (DPoint::new(10.0, 20.0), DPoint::new(12.0, 21.0)),
            (DPoint::new(359.5, -5.0), DPoint::new(0.5, -4.0)),
            (DPoint::new(83.0, 22.0), DPoint::new(263.0, -22.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(Projection::distance(a, a), 0.0);
            assert_abs_diff_eq!(
                Projection::distance(a, b),
                Projection::distance(b, a),
                epsilon = 1e-12
            );
        }
        // Quarter circle along the equator
        assert_abs_diff_eq!(
            Projection::distance(DPoint::new(0.0, 0.0), DPoint::new(90.0, 0.0)),
            90.0,
            epsilon = 1e-12
        );
        // Exact antipodes
        assert_abs_diff_eq!(
            Projection::distance(DPoint::new(83.0, 22.0), DPoint::new(263.0, -22.0)),
            180.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_distance_fast_agrees_for_small_separations() {
        let a = DPoint::new(150.0, 2.0);
        for &(dra, ddec) in &[(0.5, 0.25), (1.0, -2.0), (3.0, 1.5)] {
            let b = DPoint::new(a.x + dra, a.y + ddec);
            assert_abs_diff_eq!(
                Projection::distance_fast(a, b),
                Projection::distance(a, b),
                epsilon = 1e-8
            );
        }
    }

    #[test]
    fn test_distance_fast_saturates_near_coincidence() {
        let a = DPoint::new(150.0, 2.0);
        let b = DPoint::new(150.0, 2.0 + 1e-7);
        assert_abs_diff_eq!(Projection::distance(a, b), 1e-7, epsilon = 1e-14);
        let fast = Projection::distance_fast(a, b);
        assert!((fast - 1e-7).abs() > 5e-8, "law of cosines resolved {fast}");
        assert_abs_diff_eq!(fast, 1e-7, epsilon = 1e-5);
    }

    #[test]
    fn test_distances_near_antipodes() {
        // 1e-6 degrees north of the antipode of a
        let a = DPoint::new(10.0, 20.0);
        let b = DPoint::new(190.0, -20.0 + 1e-6);
        let expected = 180.0 - 1e-6;
        assert_abs_diff_eq!(Projection::distance(a, b), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(Projection::distance_fast(a, b), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_check_broken_line() {
        let p = projection(ProjectionId::PlateCarree, 0.0, 0.0);
        assert!(p.check_broken_line(DPoint::new(10.0, 0.0), DPoint::new(20.0, 5.0)));
        // Crosses the native longitude seam at 180
        assert!(!p.check_broken_line(DPoint::new(179.0, 0.0), DPoint::new(181.0, 0.0)));
        assert!(!p.check_broken_line(DPoint::new(f64::NAN, 0.0), DPoint::new(0.0, 0.0)));
    }
}
