//! Spherical rotation between native spherical and celestial coordinates.
//!
//! Follows the FITS-WCS Paper II conventions: the rotation is fixed by the
//! celestial coordinates of the native pole `(alpha_p, delta_p)` and the native
//! longitude of the celestial pole `phi_p`. Angles are degrees at the API and
//! radians internally.

use crate::error::ProjError;
use crate::geometry::DPoint;

/// Normalize a longitude to `[0, 360)`.
pub fn normalize_ra(deg: f64) -> f64 {
    let v = deg.rem_euclid(360.0);
    if v >= 360.0 {
        0.0
    } else {
        v
    }
}

/// Normalize a longitude to `(-180, 180]`.
pub fn normalize_pm180(deg: f64) -> f64 {
    let v = normalize_ra(deg);
    if v > 180.0 {
        v - 360.0
    } else {
        v
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalRotation {
    alpha_p: f64,
    delta_p: f64,
    phi_p: f64,
    sin_delta_p: f64,
    cos_delta_p: f64,
}

impl SphericalRotation {
    /// Build from the celestial position of the native pole and the native
    /// longitude of the celestial pole, all in degrees.
    pub fn new(alpha_p: f64, delta_p: f64, phi_p: f64) -> Self {
        let delta_p_rad = delta_p.to_radians();
        let (sin_delta_p, cos_delta_p) = delta_p_rad.sin_cos();
        Self {
            alpha_p: alpha_p.to_radians(),
            delta_p: delta_p_rad,
            phi_p: phi_p.to_radians(),
            sin_delta_p,
            cos_delta_p,
        }
    }

    /// Native longitude of the celestial pole used when LONPOLE is not given.
    pub fn default_lonpole(dec0: f64, phi0: f64, theta0: f64) -> f64 {
        if dec0 >= theta0 {
            phi0
        } else {
            phi0 + 180.0
        }
    }

    /// Build the rotation that sends the native reference point
    /// `(phi0, theta0)` to the celestial reference point `(ra0, dec0)`.
    ///
    /// `lonpole` defaults to [`SphericalRotation::default_lonpole`], `latpole`
    /// to +90 and only disambiguates between two valid pole latitudes.
    pub fn from_reference(
        ra0: f64,
        dec0: f64,
        phi0: f64,
        theta0: f64,
        lonpole: Option<f64>,
        latpole: Option<f64>,
    ) -> Result<Self, ProjError> {
        let inputs = [ra0, dec0, phi0, theta0];
        if inputs.iter().any(|v| !v.is_finite()) {
            return Err(ProjError::InvalidParameter(format!(
                "non-finite reference point {inputs:?}"
            )));
        }
        if !(-90.0..=90.0).contains(&dec0) {
            return Err(ProjError::InvalidParameter(format!(
                "reference declination {dec0} outside [-90, 90]"
            )));
        }

        let phi_p = lonpole.unwrap_or_else(|| Self::default_lonpole(dec0, phi0, theta0));
        let latpole = latpole.unwrap_or(90.0);

        // Zenithal projections: the reference point is the native pole.
        if theta0 == 90.0 {
            return Ok(Self::new(ra0, dec0, phi_p));
        }

        let delta_p = Self::compute_delta_p(dec0, theta0, phi_p - phi0, latpole)?;

        let (sin_theta_0, cos_theta_0) = theta0.to_radians().sin_cos();
        let (sin_dphi, cos_dphi) = (phi0 - phi_p).to_radians().sin_cos();
        let (sin_delta_p, cos_delta_p) = delta_p.to_radians().sin_cos();
        let x = -cos_theta_0 * sin_dphi;
        let y = sin_theta_0 * cos_delta_p - cos_theta_0 * sin_delta_p * cos_dphi;
        let alpha_p = ra0 - x.atan2(y).to_degrees();

        Ok(Self::new(normalize_ra(alpha_p), delta_p, phi_p))
    }

    fn compute_delta_p(
        dec0: f64,
        theta0: f64,
        dphi: f64,
        latpole: f64,
    ) -> Result<f64, ProjError> {
        let sin_delta_0 = dec0.to_radians().sin();
        let (sin_theta_0, cos_theta_0) = theta0.to_radians().sin_cos();
        let (sin_dphi, cos_dphi) = dphi.to_radians().sin_cos();

        let cos_theta_0_sin_dphi = cos_theta_0 * sin_dphi;
        let denom_sq = 1.0 - cos_theta_0_sin_dphi * cos_theta_0_sin_dphi;

        if denom_sq.abs() < 1e-15 {
            if sin_delta_0.abs() < 1e-15 {
                return Ok(latpole);
            }
            return Err(ProjError::InvalidParameter(
                "invalid combination of theta0, dec0 and lonpole: no solution for the pole latitude"
                    .into(),
            ));
        }

        let arg = sin_delta_0 / denom_sq.sqrt();
        if arg.abs() > 1.0 + 1e-15 {
            return Err(ProjError::InvalidParameter(
                "invalid combination of theta0, dec0 and lonpole: acos argument out of range"
                    .into(),
            ));
        }

        let acos_term = arg.clamp(-1.0, 1.0).acos().to_degrees();
        let base = sin_theta_0.atan2(cos_theta_0 * cos_dphi).to_degrees();

        let delta_p_1 = base + acos_term;
        let delta_p_2 = base - acos_term;

        const BOUNDARY_TOL: f64 = 1e-12;
        let in_range = |v: f64| (-90.0 - BOUNDARY_TOL..=90.0 + BOUNDARY_TOL).contains(&v);

        match (in_range(delta_p_1), in_range(delta_p_2)) {
            (true, false) => Ok(delta_p_1.clamp(-90.0, 90.0)),
            (false, true) => Ok(delta_p_2.clamp(-90.0, 90.0)),
            (true, true) => {
                if (delta_p_1 - latpole).abs() <= (delta_p_2 - latpole).abs() {
                    Ok(delta_p_1.clamp(-90.0, 90.0))
                } else {
                    Ok(delta_p_2.clamp(-90.0, 90.0))
                }
            }
            (false, false) => Err(ProjError::InvalidParameter(
                "no valid pole latitude in [-90, 90]".into(),
            )),
        }
    }

    /// Celestial (RA, Dec) -> native (phi, theta), degrees. Longitude in (-180, 180].
    pub fn celestial_to_native(&self, p: DPoint) -> DPoint {
        let alpha = p.x.to_radians();
        let delta = p.y.to_radians();

        let (sin_delta, cos_delta) = delta.sin_cos();
        let (sin_d_alpha, cos_d_alpha) = (alpha - self.alpha_p).sin_cos();

        let x = -cos_delta * sin_d_alpha;
        let y = sin_delta * self.cos_delta_p - cos_delta * self.sin_delta_p * cos_d_alpha;
        let z = sin_delta * self.sin_delta_p + cos_delta * self.cos_delta_p * cos_d_alpha;
        let phi = self.phi_p + x.atan2(y);
        // atan2 keeps full precision near the poles where asin(z) does not
        let theta = z.atan2(x.hypot(y));

        DPoint::new(normalize_pm180(phi.to_degrees()), theta.to_degrees())
    }

    /// Native (phi, theta) -> celestial (RA, Dec), degrees. RA in [0, 360).
    pub fn native_to_celestial(&self, p: DPoint) -> DPoint {
        let phi = p.x.to_radians();
        let theta = p.y.to_radians();

        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_d_phi, cos_d_phi) = (phi - self.phi_p).sin_cos();

        let x = -cos_theta * sin_d_phi;
        let y = sin_theta * self.cos_delta_p - cos_theta * self.sin_delta_p * cos_d_phi;
        let z = sin_theta * self.sin_delta_p + cos_theta * self.cos_delta_p * cos_d_phi;
        let alpha = self.alpha_p + x.atan2(y);
        let delta = z.atan2(x.hypot(y));

        DPoint::new(normalize_ra(alpha.to_degrees()), delta.to_degrees())
    }

    /// Celestial coordinates of the native pole, degrees.
    pub fn native_pole(&self) -> DPoint {
        DPoint::new(self.alpha_p.to_degrees(), self.delta_p.to_degrees())
    }

    /// Native longitude of the celestial pole, degrees.
    pub fn phi_p(&self) -> f64 {
        self.phi_p.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize() {
        assert_abs_diff_eq!(normalize_ra(-10.0), 350.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_ra(725.0), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_pm180(190.0), -170.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_pm180(180.0), 180.0, epsilon = 1e-12);
        assert!(normalize_ra(f64::NAN).is_nan());
    }

    #[test]
    fn test_zenithal_reference_maps_to_native_pole() {
        let rot = SphericalRotation::from_reference(150.0, 30.0, 0.0, 90.0, None, None).unwrap();
        assert_abs_diff_eq!(rot.phi_p(), 180.0, epsilon = 1e-12);
        let n = rot.celestial_to_native(DPoint::new(150.0, 30.0));
        assert_abs_diff_eq!(n.y, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_latitude_precise_near_native_pole() {
        let rot = SphericalRotation::from_reference(150.0, 30.0, 0.0, 90.0, None, None).unwrap();
        for offset in [0.0, 1e-9, 1e-6, 1e-3] {
            let n = rot.celestial_to_native(DPoint::new(150.0, 30.0 + offset));
            assert_abs_diff_eq!(n.y, 90.0 - offset, epsilon = 1e-12);
            let c = rot.native_to_celestial(n);
            assert_abs_diff_eq!(c.x, 150.0, epsilon = 1e-10);
            assert_abs_diff_eq!(c.y, 30.0 + offset, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cylindrical_reference_maps_to_native_origin() {
        for &(ra0, dec0) in &[(0.0, 0.0), (83.6, 22.0), (266.4, -29.0), (10.0, 89.0)] {
            let rot = SphericalRotation::from_reference(ra0, dec0, 0.0, 0.0, None, None).unwrap();
            let n = rot.celestial_to_native(DPoint::new(ra0, dec0));
            assert_abs_diff_eq!(n.x, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(n.y, 0.0, epsilon = 1e-9);
            let c = rot.native_to_celestial(DPoint::new(0.0, 0.0));
            assert_abs_diff_eq!(c.x, ra0, epsilon = 1e-9);
            assert_abs_diff_eq!(c.y, dec0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rotation_roundtrip() {
        let rot = SphericalRotation::new(45.0, 60.0, 180.0);
        for &(ra, dec) in &[(10.0, 20.0), (200.0, -45.0), (359.0, 80.0), (45.0, 0.0)] {
            let n = rot.celestial_to_native(DPoint::new(ra, dec));
            let c = rot.native_to_celestial(n);
            assert_abs_diff_eq!(c.x, ra, epsilon = 1e-9);
            assert_abs_diff_eq!(c.y, dec, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_nan_propagates() {
        let rot = SphericalRotation::new(0.0, 90.0, 180.0);
        assert!(!rot.celestial_to_native(DPoint::new(f64::NAN, 0.0)).is_finite());
        assert!(!rot.native_to_celestial(DPoint::new(0.0, f64::NAN)).is_finite());
    }

    #[test]
    fn test_invalid_reference() {
        assert!(SphericalRotation::from_reference(0.0, 95.0, 0.0, 90.0, None, None).is_err());
        assert!(SphericalRotation::from_reference(f64::NAN, 0.0, 0.0, 0.0, None, None).is_err());
    }
}
