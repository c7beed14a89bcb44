//! Resampling by integer factors: pixel replication and block downsampling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{run_channels, TransformSummary};
use super::{EngineConfig, GeometricTransformation};
use crate::error::WarpError;
use crate::image::{Image, Sample};

/// Aggregation of each `n x n` block when downsampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownsampleMode {
    #[default]
    Average,
    Median,
    Maximum,
    Minimum,
}

impl DownsampleMode {
    /// Aggregate `block`, which may be reordered.
    fn aggregate(&self, block: &mut [f64]) -> f64 {
        match self {
            Self::Average => block.iter().sum::<f64>() / block.len() as f64,
            Self::Maximum => block.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Minimum => block.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Median => {
                let n = block.len();
                let mid = n / 2;
                block.select_nth_unstable_by(mid, f64::total_cmp);
                let upper = block[mid];
                if n % 2 == 1 {
                    upper
                } else {
                    let lower = block[..mid].iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    (lower + upper) / 2.0
                }
            }
        }
    }
}

/// Zoom by an integer factor. Positive factors enlarge the image by pixel
/// replication; negative factors `-n` shrink it by aggregating `n x n`
/// blocks. Factors 1 and -1 leave the image unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegerResample {
    zoom: i32,
    mode: DownsampleMode,
    config: EngineConfig,
}

impl Default for IntegerResample {
    fn default() -> Self {
        Self {
            zoom: 1,
            mode: DownsampleMode::default(),
            config: EngineConfig::default(),
        }
    }
}

impl IntegerResample {
    pub fn new(zoom: i32) -> Self {
        Self {
            zoom,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: DownsampleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: i32) {
        self.zoom = zoom;
    }

    pub fn mode(&self) -> DownsampleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DownsampleMode) {
        self.mode = mode;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl GeometricTransformation for IntegerResample {
    fn new_sizes(&self, width: usize, height: usize) -> (usize, usize) {
        let n = self.zoom.unsigned_abs() as usize;
        match self.zoom {
            z if z > 1 => (width.saturating_mul(n), height.saturating_mul(n)),
            z if z < -1 => (width / n, height / n),
            _ => (width, height),
        }
    }

    fn apply<T: Sample>(&self, image: &mut Image<T>) -> Result<TransformSummary, WarpError> {
        if self.zoom == 0 {
            return Err(WarpError::InvalidParameter("zero zoom factor".into()));
        }
        let (width, height) = (image.width(), image.height());
        if self.zoom.unsigned_abs() == 1 {
            return Ok(TransformSummary {
                width,
                height,
                background_pixels: 0,
            });
        }
        let n = self.zoom.unsigned_abs() as usize;
        let (new_w, new_h) = self.new_sizes(width, height);
        if !image.is_empty() && (new_w == 0 || new_h == 0) {
            return Err(WarpError::InvalidParameter(format!(
                "{width}x{height} image is smaller than the {n}x{n} downsampling block"
            )));
        }
        debug!(zoom = self.zoom, mode = ?self.mode, new_w, new_h, "integer resampling");

        if self.zoom > 0 {
            run_channels(image, new_w, new_h, &self.config, &[], |ctx, band, out, batch| {
                for (i, line) in out.chunks_exact_mut(ctx.width).enumerate() {
                    let src_row = ctx.source.row((band.row_start + i) / n);
                    for (col, v) in line.iter_mut().enumerate() {
                        *v = src_row[col / n];
                    }
                    batch.advance(ctx.width)?;
                }
                Ok(0)
            })
        } else {
            let mode = self.mode;
            run_channels(image, new_w, new_h, &self.config, &[], |ctx, band, out, batch| {
                let mut block = Vec::with_capacity(n * n);
                for (i, line) in out.chunks_exact_mut(ctx.width).enumerate() {
                    let row0 = (band.row_start + i) * n;
                    for (col, v) in line.iter_mut().enumerate() {
                        let col0 = col * n;
                        block.clear();
                        for r in row0..row0 + n {
                            block.extend(ctx.source.row(r).iter().skip(col0).take(n));
                        }
                        *v = mode.aggregate(&mut block);
                    }
                    batch.advance(ctx.width)?;
                }
                Ok(0)
            })
        }
    }
}
