//! Image pixel <-> celestial coordinate solutions.
//!
//! Image coordinates are corner-based with the y axis pointing down: the
//! center of the top-left pixel is `(0.5, 0.5)`.

use tracing::debug;

use crate::affine::Affine;
use crate::error::WarpError;
use crate::geometry::{DPoint, DRect};
use crate::proj::{Projection, ProjectionFactory, WcsKeywords};

/// Maps pixels of one image to celestial coordinates and back.
///
/// Both directions return `None` when the point is not invertible or falls
/// outside the domain of the underlying projection.
pub trait AstrometricSolution: Send + Sync {
    fn image_to_celestial(&self, p: DPoint) -> Option<DPoint>;

    fn celestial_to_image(&self, p: DPoint) -> Option<DPoint>;

    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn bounds(&self) -> DRect {
        DRect::from_size(self.width(), self.height())
    }
}

/// A projection plus a linear pixel <-> world plane map.
#[derive(Clone, Debug)]
pub struct LinearWcsSolution {
    projection: Projection,
    image_to_world: Affine,
    world_to_image: Affine,
    width: usize,
    height: usize,
}

impl LinearWcsSolution {
    pub fn new(
        projection: Projection,
        image_to_world: Affine,
        width: usize,
        height: usize,
    ) -> Result<Self, WarpError> {
        let world_to_image = image_to_world
            .inverse()
            .map_err(|e| WarpError::Degenerate(format!("pixel to world map: {e}")))?;
        Ok(Self {
            projection,
            image_to_world,
            world_to_image,
            width,
            height,
        })
    }

    /// Build from FITS keywords for an image of `width x height` pixels.
    pub fn from_wcs(wcs: &WcsKeywords, width: usize, height: usize) -> Result<Self, WarpError> {
        let projection = ProjectionFactory::create(wcs)?;
        let (crpix1, crpix2) = wcs.reference_pixel()?;
        let [[cd11, cd12], [cd21, cd22]] = wcs.linear_matrix()?;

        // FITS pixel (p1, p2) = (x + 0.5, height - y + 0.5)
        let h = height as f64;
        let dp1 = 0.5 - crpix1;
        let dp2 = h + 0.5 - crpix2;
        let image_to_world = Affine::new(
            cd11,
            -cd12,
            cd11 * dp1 + cd12 * dp2,
            cd21,
            -cd22,
            cd21 * dp1 + cd22 * dp2,
        );
        debug!(
            width,
            height,
            code = projection.proj_code(),
            "linear WCS solution from keywords"
        );
        Self::new(projection, image_to_world, width, height)
    }

    /// Serialize back to FITS keywords.
    pub fn to_wcs(&self) -> WcsKeywords {
        let origin = self.world_to_image.forward_point(DPoint::new(0.0, 0.0));
        let crpix = (origin.x + 0.5, self.height as f64 - origin.y + 0.5);
        let m = &self.image_to_world;
        let [ra0, dec0] = self.projection.reference_celestial_coordinates();
        let mut wcs = WcsKeywords::new(
            self.projection.proj_code(),
            (ra0, dec0),
            crpix,
            [[m.a, -m.b], [m.d, -m.e]],
        );
        let [lonpole, latpole] = self.projection.celestial_pole_native_coordinates();
        wcs.lonpole = Some(lonpole);
        wcs.latpole = Some(latpole);
        let [phi0, theta0] = self.projection.reference_native_coordinates();
        let default_native = ProjectionFactory::family(self.projection.id()).native_reference();
        if phi0 != default_native.x || theta0 != default_native.y {
            wcs.pv1_1 = Some(phi0);
            wcs.pv1_2 = Some(theta0);
        }
        wcs
    }

    /// Mean pixel scale in degrees per pixel.
    pub fn resolution(&self) -> f64 {
        self.image_to_world.determinant().abs().sqrt()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn image_to_world(&self) -> &Affine {
        &self.image_to_world
    }

    pub fn world_to_image(&self) -> &Affine {
        &self.world_to_image
    }
}

impl AstrometricSolution for LinearWcsSolution {
    fn image_to_celestial(&self, p: DPoint) -> Option<DPoint> {
        if !p.is_finite() {
            return None;
        }
        self.projection.inverse(self.image_to_world.forward_point(p))
    }

    fn celestial_to_image(&self, p: DPoint) -> Option<DPoint> {
        let world = self.projection.direct(p)?;
        Some(self.world_to_image.forward_point(world)).filter(DPoint::is_finite)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tan_solution() -> LinearWcsSolution {
        let wcs = WcsKeywords::new(
            "TAN",
            (150.0, 2.0),
            (50.5, 40.5),
            [[-2.0e-4, 1.0e-5], [1.5e-5, 2.0e-4]],
        );
        LinearWcsSolution::from_wcs(&wcs, 100, 80).unwrap()
    }

    #[test]
    fn test_reference_pixel_maps_to_crval() {
        let s = tan_solution();
        // FITS (50.5, 40.5) on an 80 row image is (50.0, 40.0) here
        let c = s.image_to_celestial(DPoint::new(50.0, 40.0)).unwrap();
        assert_abs_diff_eq!(c.x, 150.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c.y, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_orientation() {
        // CD1_1 < 0: RA increases to the left; y down means Dec increases upwards
        let wcs = WcsKeywords::new("TAN", (10.0, 0.0), (5.5, 5.5), [[-0.01, 0.0], [0.0, 0.01]]);
        let s = LinearWcsSolution::from_wcs(&wcs, 10, 10).unwrap();
        let center = s.image_to_celestial(DPoint::new(5.0, 5.0)).unwrap();
        let left = s.image_to_celestial(DPoint::new(4.0, 5.0)).unwrap();
        let up = s.image_to_celestial(DPoint::new(5.0, 4.0)).unwrap();
        assert!(left.x > center.x);
        assert!(up.y > center.y);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let s = tan_solution();
        for &(x, y) in &[(0.5, 0.5), (99.5, 79.5), (12.25, 61.75)] {
            let c = s.image_to_celestial(DPoint::new(x, y)).unwrap();
            let p = s.celestial_to_image(c).unwrap();
            assert_abs_diff_eq!(p.x, x, epsilon = 1e-7);
            assert_abs_diff_eq!(p.y, y, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_wcs_roundtrip() {
        let s = tan_solution();
        let again = LinearWcsSolution::from_wcs(&s.to_wcs(), 100, 80).unwrap();
        let p = DPoint::new(33.0, 17.0);
        let c1 = s.image_to_celestial(p).unwrap();
        let c2 = again.image_to_celestial(p).unwrap();
        assert_abs_diff_eq!(c1.x, c2.x, epsilon = 1e-10);
        assert_abs_diff_eq!(c1.y, c2.y, epsilon = 1e-10);
        let wcs = s.to_wcs();
        assert_abs_diff_eq!(wcs.crpix1.unwrap(), 50.5, epsilon = 1e-9);
        assert_abs_diff_eq!(wcs.crpix2.unwrap(), 40.5, epsilon = 1e-9);
        assert_eq!(wcs.pv1_1, None);
    }

    #[test]
    fn test_resolution() {
        let wcs = WcsKeywords::new("CAR", (0.0, 0.0), (1.0, 1.0), [[-0.5, 0.0], [0.0, 0.5]]);
        let s = LinearWcsSolution::from_wcs(&wcs, 4, 4).unwrap();
        assert_abs_diff_eq!(s.resolution(), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_out_of_domain() {
        // Far beyond the gnomonic horizon in world coordinates still inverts,
        // but the antipode of the reference cannot be projected.
        let s = tan_solution();
        assert!(s.celestial_to_image(DPoint::new(330.0, -2.0)).is_none());
        assert!(s.image_to_celestial(DPoint::new(f64::NAN, 1.0)).is_none());
    }

    #[test]
    fn test_missing_keywords() {
        let mut wcs = WcsKeywords::new("TAN", (0.0, 0.0), (1.0, 1.0), [[1e-3, 0.0], [0.0, 1e-3]]);
        wcs.crpix1 = None;
        assert!(LinearWcsSolution::from_wcs(&wcs, 10, 10).is_err());
    }
}
