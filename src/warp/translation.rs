//! Sub-pixel translation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{interpolate, TransformSummary};
use super::{EngineConfig, GeometricTransformation};
use crate::affine::Affine;
use crate::error::WarpError;
use crate::geometry::DPoint;
use crate::image::{Image, Sample};

/// Moves image content by `delta` pixels; positive x moves it right,
/// positive y moves it down. The image size is unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    delta: DPoint,
    fill: Vec<f64>,
    fast_path: bool,
    config: EngineConfig,
}

impl Default for Translation {
    fn default() -> Self {
        Self {
            delta: DPoint::default(),
            fill: Vec::new(),
            fast_path: true,
            config: EngineConfig::default(),
        }
    }
}

impl Translation {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self {
            delta: DPoint::new(dx, dy),
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, fill: Vec<f64>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_fast_path(mut self, enabled: bool) -> Self {
        self.fast_path = enabled;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn delta(&self) -> DPoint {
        self.delta
    }

    pub fn set_delta(&mut self, delta: DPoint) {
        self.delta = delta;
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
}

impl GeometricTransformation for Translation {
    fn new_sizes(&self, width: usize, height: usize) -> (usize, usize) {
        (width, height)
    }

    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError> {
        if !self.delta.is_finite() {
            return Err(WarpError::InvalidParameter(format!(
                "translation {:?}",
                self.delta
            )));
        }
        let (width, height) = (image.width(), image.height());
        if self.fast_path && self.delta == DPoint::default() {
            return Ok(TransformSummary {
                width,
                height,
                background_pixels: 0,
            });
        }
        debug!(dx = self.delta.x, dy = self.delta.y, "translating image");
        let law = Affine::translation(-self.delta.x, -self.delta.y);
        interpolate(image, width, height, &law, &self.fill, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::PixelInterpolation;
    use crate::warp::test_support::{convert, pattern};

    #[test]
    fn test_zero_delta_is_noop() {
        let mut image: Image<u32> = convert(&pattern(9, 9, 1));
        let original = image.clone();
        Translation::new(0.0, 0.0).apply(&mut image).unwrap();
        assert_eq!(image.channels(), original.channels());

        let summary = Translation::new(0.0, 0.0)
            .with_fast_path(false)
            .apply(&mut image)
            .unwrap();
        assert_eq!(summary.background_pixels, 0);
        assert_eq!(image.channels(), original.channels());
    }

    #[test]
    fn test_integer_shift() {
        let original = pattern(12, 8, 1);
        let mut image = original.clone();
        let config = EngineConfig::default().with_interpolation(PixelInterpolation::Nearest);
        let summary = Translation::new(3.0, -2.0)
            .with_fill(vec![0.75])
            .with_config(config)
            .apply(&mut image)
            .unwrap();
        // 3 columns on the left and 2 rows at the bottom are uncovered
        assert_eq!(summary.background_pixels, 3 * 8 + 2 * 12 - 3 * 2);
        let (src, dst) = (original.channel(0), image.channel(0));
        assert_eq!(dst[(0, 3)], src[(2, 0)]);
        assert_eq!(dst[(5, 11)], src[(7, 8)]);
        assert_eq!(dst[(0, 0)], 0.75);
        assert_eq!(dst[(7, 6)], 0.75);
    }

    #[test]
    fn test_half_pixel_shift_averages_neighbours() {
        let mut image = Image::from_channels(
            vec![ndarray::array![[0.0f64, 1.0, 0.0, 1.0]]],
            crate::image::ColorSpace::Gray,
        )
        .unwrap();
        Translation::new(0.5, 0.0).apply(&mut image).unwrap();
        assert!((image.channel(0)[(0, 1)] - 0.5).abs() < 1e-12);
        assert!((image.channel(0)[(0, 2)] - 0.5).abs() < 1e-12);
    }
}
