//! Geometric transformations executed by the parallel band engine.

pub mod engine;
pub mod integer_resample;
pub mod reproject;
pub mod resample;
pub mod rotation;
pub mod translation;

use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::gamma::WorkingGamma;
use crate::image::{with_variant, Image, ImageVariant, Sample};
use crate::resample::PixelInterpolation;

pub use engine::{CoordinateLaw, TransformSummary};
pub use integer_resample::{DownsampleMode, IntegerResample};
pub use reproject::AstrometricReprojection;
pub use resample::{AbsoluteResizeMode, Resample, ResampleMode};
pub use rotation::Rotation;
pub use translation::Translation;

/// Minimum number of destination pixels worth a thread of its own.
pub const DEFAULT_OVERHEAD_LIMIT: usize = 4096;

/// Execution settings shared by every transformation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub interpolation: PixelInterpolation,
    /// Let kernels read a border-replicated extension of the source.
    pub unclipped: bool,
    /// Interpolate in linear light.
    pub gamma_correction: bool,
    pub gamma: WorkingGamma,
    /// Worker thread limit; 0 uses all available processors.
    pub max_processors: usize,
    /// Minimum number of destination pixels per band.
    pub overhead_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpolation: PixelInterpolation::default(),
            unclipped: false,
            gamma_correction: false,
            gamma: WorkingGamma::default(),
            max_processors: 0,
            overhead_limit: DEFAULT_OVERHEAD_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn with_interpolation(mut self, interpolation: PixelInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_unclipped(mut self, unclipped: bool) -> Self {
        self.unclipped = unclipped;
        self
    }

    pub fn with_gamma_correction(mut self, enabled: bool, gamma: WorkingGamma) -> Self {
        self.gamma_correction = enabled;
        self.gamma = gamma;
        self
    }

    pub fn with_max_processors(mut self, max_processors: usize) -> Self {
        self.max_processors = max_processors;
        self
    }

    pub fn with_overhead_limit(mut self, pixels: usize) -> Self {
        self.overhead_limit = pixels;
        self
    }

    /// Effective number of worker threads.
    pub fn thread_count(&self) -> usize {
        if self.max_processors == 0 {
            rayon::current_num_threads()
        } else {
            self.max_processors
        }
    }
}

/// A transformation that replaces the pixels of an image with a
/// geometrically transformed copy.
pub trait GeometricTransformation {
    /// Dimensions of the output for a `width x height` input.
    fn new_sizes(&self, width: usize, height: usize) -> (usize, usize);

    /// Transform `image` in place. On failure, including cancellation, the
    /// image is left empty.
    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError>;

    /// Dispatch on the sample representation of `image`.
    fn apply_variant(&self, image: &mut ImageVariant) -> Result<TransformSummary, WarpError> {
        with_variant!(image, img => self.apply(img))
    }
}

/// Per-channel fill value, defaulting to the minimum sample value.
pub(crate) fn fill_for(fill: &[f64], channel: usize) -> f64 {
    fill.get(channel).copied().unwrap_or(0.0)
}
