//! Rotation about a point.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{interpolate, TransformSummary};
use super::{EngineConfig, GeometricTransformation};
use crate::affine::Affine;
use crate::error::WarpError;
use crate::geometry::DPoint;
use crate::image::{Image, Sample};

/// Counter-clockwise rotation (y axis pointing down) by `angle` radians.
///
/// Clipped rotations keep the image size and rotate about `center`, which
/// defaults to the image center. Unclipped rotations enlarge the canvas to
/// hold the whole rotated image and always rotate about the image center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    angle: f64,
    center: Option<DPoint>,
    unclipped: bool,
    fill: Vec<f64>,
    fast_path: bool,
    config: EngineConfig,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            angle: 0.0,
            center: None,
            unclipped: false,
            fill: Vec::new(),
            fast_path: true,
            config: EngineConfig::default(),
        }
    }
}

impl Rotation {
    pub fn new(angle: f64) -> Self {
        Self {
            angle,
            ..Default::default()
        }
    }

    pub fn with_center(mut self, center: DPoint) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_unclipped(mut self, unclipped: bool) -> Self {
        self.unclipped = unclipped;
        self
    }

    /// Normalized per-channel fill values for uncovered pixels.
    pub fn with_fill(mut self, fill: Vec<f64>) -> Self {
        self.fill = fill;
        self
    }

    /// When enabled (the default) a zero rotation leaves the image untouched
    /// instead of resampling it.
    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
    }

    pub fn center(&self) -> Option<DPoint> {
        self.center
    }

    pub fn set_center(&mut self, center: Option<DPoint>) {
        self.center = center;
    }

    pub fn is_unclipped(&self) -> bool {
        self.unclipped
    }

    pub fn set_unclipped(&mut self, unclipped: bool) {
        self.unclipped = unclipped;
    }

    pub fn fill(&self) -> &[f64] {
        &self.fill
    }

    pub fn set_fill(&mut self, fill: Vec<f64>) {
        self.fill = fill;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Size of the smallest canvas holding a `width x height` image rotated
    /// by `angle` radians.
    pub fn unclipped_bounds(width: usize, height: usize, angle: f64) -> (usize, usize) {
        let (sin_a, cos_a) = angle.sin_cos();
        let (w, h) = (width as f64, height as f64);
        let new_w = (w * cos_a.abs() + h * sin_a.abs()).round().max(1.0);
        let new_h = (w * sin_a.abs() + h * cos_a.abs()).round().max(1.0);
        (new_w as usize, new_h as usize)
    }

    fn is_identity(&self) -> bool {
        self.angle.rem_euclid(TAU) == 0.0
    }

    /// Destination -> source map for a `width x height` source.
    pub fn coordinate_law(&self, width: usize, height: usize) -> Affine {
        let image_center = DPoint::new(width as f64 / 2.0, height as f64 / 2.0);
        if self.unclipped {
            let (new_w, new_h) = self.new_sizes(width, height);
            let dst_center = DPoint::new(new_w as f64 / 2.0, new_h as f64 / 2.0);
            Affine::rotation_about(self.angle, image_center, dst_center)
        } else {
            let center = self.center.unwrap_or(image_center);
            Affine::rotation_about(self.angle, center, center)
        }
    }
}

impl GeometricTransformation for Rotation {
    fn new_sizes(&self, width: usize, height: usize) -> (usize, usize) {
        if self.unclipped && width > 0 && height > 0 {
            Self::unclipped_bounds(width, height, self.angle)
        } else {
            (width, height)
        }
    }

    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError> {
        if !self.angle.is_finite() {
            return Err(WarpError::InvalidParameter(format!(
                "rotation angle {}",
                self.angle
            )));
        }
        if self.fast_path && self.is_identity() {
            debug!("zero rotation, image left untouched");
            return Ok(TransformSummary {
                width: image.width(),
                height: image.height(),
                background_pixels: 0,
            });
        }
        let (width, height) = (image.width(), image.height());
        let (new_w, new_h) = self.new_sizes(width, height);
        let law = self.coordinate_law(width, height);
        debug!(
            angle_deg = self.angle.to_degrees(),
            unclipped = self.unclipped,
            new_w,
            new_h,
            "rotating image"
        );
        interpolate(image, new_w, new_h, &law, &self.fill, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};

    use super::*;
    use crate::image::ImageVariant;
    use crate::resample::PixelInterpolation;
    use crate::warp::test_support::{convert, init_tracing, pattern};

    fn nearest() -> EngineConfig {
        EngineConfig::default().with_interpolation(PixelInterpolation::Nearest)
    }

    #[test]
    fn test_zero_angle_fast_path_is_exact() {
        let mut image: Image<u16> = convert(&pattern(17, 11, 2));
        let original = image.clone();
        let summary = Rotation::new(0.0).apply(&mut image).unwrap();
        assert_eq!(summary.background_pixels, 0);
        assert_eq!(image.channels(), original.channels());
    }

    #[test]
    fn test_zero_angle_forced_interpolation() {
        let mut image: Image<u16> = convert(&pattern(17, 11, 2));
        let original = image.clone();
        let summary = Rotation::new(0.0).with_fast_path(false).apply(&mut image).unwrap();
        assert_eq!(summary.background_pixels, 0);
        assert_eq!((image.width(), image.height()), (17, 11));
        // Pixel centers map onto pixel centers
        assert_eq!(image.channels(), original.channels());
    }

    #[test]
    fn test_half_turn_twice_restores_image() {
        init_tracing();
        let original = pattern(20, 14, 1);

        let mut image = original.clone();
        let rot = Rotation::new(PI).with_config(nearest());
        rot.apply(&mut image).unwrap();
        assert_eq!(image.channel(0)[(0, 0)], original.channel(0)[(13, 19)]);
        rot.apply(&mut image).unwrap();
        assert_eq!(image.channels(), original.channels());

        let mut image = original.clone();
        let rot = Rotation::new(PI);
        rot.apply(&mut image).unwrap();
        rot.apply(&mut image).unwrap();
        for (a, b) in image.channel(0).iter().zip(original.channel(0).iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unclipped_bounds() {
        assert_eq!(Rotation::unclipped_bounds(100, 50, FRAC_PI_6), (112, 93));
        assert_eq!(Rotation::unclipped_bounds(100, 50, FRAC_PI_4), (106, 106));
        assert_eq!(Rotation::unclipped_bounds(100, 50, FRAC_PI_2), (50, 100));
        assert_eq!(Rotation::unclipped_bounds(100, 50, -FRAC_PI_6), (112, 93));

        let rot = Rotation::new(FRAC_PI_6).with_unclipped(true);
        assert!(rot.is_unclipped());
        assert_eq!(rot.new_sizes(100, 50), (112, 93));
        assert_eq!(Rotation::new(FRAC_PI_6).new_sizes(100, 50), (100, 50));
    }

    #[test]
    fn test_unclipped_quarter_turn_moves_pixels() {
        let original = pattern(10, 6, 1);
        let mut image = original.clone();
        let summary = Rotation::new(FRAC_PI_2)
            .with_unclipped(true)
            .with_config(nearest())
            .apply(&mut image)
            .unwrap();
        assert_eq!((summary.width, summary.height), (6, 10));
        assert_eq!(summary.background_pixels, 0);
        let src = original.channel(0);
        let dst = image.channel(0);
        for r in 0..10 {
            for c in 0..6 {
                assert_eq!(dst[(r, c)], src[(c, 9 - r)], "pixel ({c}, {r})");
            }
        }
    }

    #[test]
    fn test_clipped_rotation_fills_corners() {
        let mut image = Image::<u8>::new(20, 20, 1, crate::image::ColorSpace::Gray);
        image.channel_mut(0).fill(100);
        let summary = Rotation::new(FRAC_PI_4)
            .with_fill(vec![1.0])
            .with_config(nearest())
            .apply(&mut image)
            .unwrap();
        assert!(summary.background_pixels > 0);
        assert_eq!(image.channel(0)[(0, 0)], 255);
        assert_eq!(image.channel(0)[(10, 10)], 100);
    }

    #[test]
    fn test_custom_center() {
        // Half turn about the center of the top-left pixel keeps that pixel
        let original = pattern(8, 8, 1);
        let mut image = original.clone();
        Rotation::new(PI)
            .with_center(DPoint::new(0.5, 0.5))
            .with_config(nearest())
            .apply(&mut image)
            .unwrap();
        assert_eq!(image.channel(0)[(0, 0)], original.channel(0)[(0, 0)]);
        assert_eq!(image.channel(0)[(7, 7)], 0.0);
    }

    fn rotate_with_threads<T: Sample>(threads: usize) -> Image<T> {
        let mut image: Image<T> = convert(&pattern(37, 29, 3));
        let config = EngineConfig::default()
            .with_interpolation(PixelInterpolation::Bicubic)
            .with_max_processors(threads)
            .with_overhead_limit(37);
        Rotation::new(0.4)
            .with_unclipped(true)
            .with_config(config)
            .apply(&mut image)
            .unwrap();
        image
    }

    fn assert_thread_independent<T: Sample>() {
        let single = rotate_with_threads::<T>(1);
        let multi = rotate_with_threads::<T>(4);
        assert_eq!(single.channels(), multi.channels());
    }

    #[test]
    fn test_output_independent_of_thread_count() {
        assert_thread_independent::<f32>();
        assert_thread_independent::<f64>();
        assert_thread_independent::<u8>();
        assert_thread_independent::<u16>();
        assert_thread_independent::<u32>();
    }

    #[test]
    fn test_apply_variant() {
        let mut variant = ImageVariant::from(convert::<u8>(&pattern(30, 20, 1)));
        let summary = Rotation::new(FRAC_PI_2)
            .with_unclipped(true)
            .apply_variant(&mut variant)
            .unwrap();
        assert_eq!((summary.width, summary.height), (20, 30));
        assert_eq!((variant.width(), variant.height()), (20, 30));
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let mut image = pattern(4, 4, 1);
        assert!(Rotation::new(f64::NAN).apply(&mut image).is_err());
        assert_eq!(image.width(), 4);
    }

    #[test]
    fn test_serde_roundtrip() {
        let rot = Rotation::new(0.3).with_center(DPoint::new(5.0, 6.0)).with_fill(vec![0.5]);
        let json = serde_json::to_string(&rot).unwrap();
        let back: Rotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rot);
    }
}
