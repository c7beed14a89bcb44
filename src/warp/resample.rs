//! Resampling to new image dimensions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{interpolate, TransformSummary};
use super::{EngineConfig, GeometricTransformation};
use crate::affine::Affine;
use crate::error::WarpError;
use crate::image::{Image, Sample};

/// How `x_size` and `y_size` are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleMode {
    /// Scaling factors.
    #[default]
    Relative,
    /// Target dimensions in pixels.
    AbsolutePixels,
    /// Target dimensions in physical units, converted with the resolution.
    AbsolutePhysical,
    /// Target area `x_size * y_size` in pixels, preserving the aspect ratio.
    ForceArea,
}

/// Which absolute dimensions are imposed; the other one keeps the aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsoluteResizeMode {
    #[default]
    ForceWidthAndHeight,
    ForceWidth,
    ForceHeight,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resample {
    x_size: f64,
    y_size: f64,
    mode: ResampleMode,
    absolute_mode: AbsoluteResizeMode,
    /// Pixels per physical unit, used by [`ResampleMode::AbsolutePhysical`].
    x_resolution: f64,
    y_resolution: f64,
    config: EngineConfig,
}

impl Default for Resample {
    fn default() -> Self {
        Self {
            x_size: 1.0,
            y_size: 1.0,
            mode: ResampleMode::Relative,
            absolute_mode: AbsoluteResizeMode::ForceWidthAndHeight,
            x_resolution: 72.0,
            y_resolution: 72.0,
            config: EngineConfig::default(),
        }
    }
}

impl Resample {
    /// Relative resampling by the given scaling factors.
    pub fn relative(x_scale: f64, y_scale: f64) -> Self {
        Self {
            x_size: x_scale,
            y_size: y_scale,
            ..Default::default()
        }
    }

    /// Absolute resampling to `width x height` pixels.
    pub fn to_pixels(width: f64, height: f64, absolute_mode: AbsoluteResizeMode) -> Self {
        Self {
            x_size: width,
            y_size: height,
            mode: ResampleMode::AbsolutePixels,
            absolute_mode,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: ResampleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_absolute_mode(mut self, absolute_mode: AbsoluteResizeMode) -> Self {
        self.absolute_mode = absolute_mode;
        self
    }

    pub fn with_resolution(mut self, x_resolution: f64, y_resolution: f64) -> Self {
        self.x_resolution = x_resolution;
        self.y_resolution = y_resolution;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn size(&self) -> (f64, f64) {
        (self.x_size, self.y_size)
    }

    pub fn set_size(&mut self, x_size: f64, y_size: f64) {
        self.x_size = x_size;
        self.y_size = y_size;
    }

    pub fn mode(&self) -> ResampleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResampleMode) {
        self.mode = mode;
    }

    pub fn absolute_mode(&self) -> AbsoluteResizeMode {
        self.absolute_mode
    }

    pub fn set_absolute_mode(&mut self, absolute_mode: AbsoluteResizeMode) {
        self.absolute_mode = absolute_mode;
    }

    pub fn resolution(&self) -> (f64, f64) {
        (self.x_resolution, self.y_resolution)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn validate(&self) -> Result<(), WarpError> {
        let mut values = vec![self.x_size, self.y_size];
        if self.mode == ResampleMode::AbsolutePhysical {
            values.extend([self.x_resolution, self.y_resolution]);
        }
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(WarpError::InvalidParameter(format!(
                "resample sizes {:?} in {:?} mode",
                values, self.mode
            )));
        }
        Ok(())
    }

    fn absolute_sizes(&self, w: f64, h: f64, target_w: f64, target_h: f64) -> (f64, f64) {
        match self.absolute_mode {
            AbsoluteResizeMode::ForceWidthAndHeight => (target_w, target_h),
            AbsoluteResizeMode::ForceWidth => (target_w, h * target_w / w),
            AbsoluteResizeMode::ForceHeight => (w * target_h / h, target_h),
        }
    }
}

impl GeometricTransformation for Resample {
    fn new_sizes(&self, width: usize, height: usize) -> (usize, usize) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        let (w, h) = (width as f64, height as f64);
        let (new_w, new_h) = match self.mode {
            ResampleMode::Relative => (w * self.x_size, h * self.y_size),
            ResampleMode::AbsolutePixels => self.absolute_sizes(w, h, self.x_size, self.y_size),
            ResampleMode::AbsolutePhysical => self.absolute_sizes(
                w,
                h,
                self.x_size * self.x_resolution,
                self.y_size * self.y_resolution,
            ),
            ResampleMode::ForceArea => {
                let k = (self.x_size * self.y_size / (w * h)).sqrt();
                (w * k, h * k)
            }
        };
        (
            new_w.round().max(1.0) as usize,
            new_h.round().max(1.0) as usize,
        )
    }

    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError> {
        self.validate()?;
        let (width, height) = (image.width(), image.height());
        let (new_w, new_h) = self.new_sizes(width, height);
        debug!(width, height, new_w, new_h, mode = ?self.mode, "resampling image");
        let law = Affine::scaling(
            width as f64 / new_w.max(1) as f64,
            height as f64 / new_h.max(1) as f64,
        );
        interpolate(image, new_w, new_h, &law, &[], &self.config)
    }
}
