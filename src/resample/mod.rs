//! Pixel interpolation kernels for the warp engine.
//!
//! Coordinates use the corner-based convention: pixel `(c, r)` covers
//! `[c, c+1) x [r, r+1)` and has its center at `(c + 0.5, r + 0.5)`.
//! Kernels operate on normalized `f64` channel buffers.

pub mod bilinear;
pub mod cubic;
pub mod lanczos;
pub mod nearest;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Available interpolation methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelInterpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl PixelInterpolation {
    /// Parse from a string name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "nearestneighbor" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            "bicubic" | "cubic" => Some(Self::Bicubic),
            "lanczos" | "lanczos3" => Some(Self::Lanczos3),
            _ => None,
        }
    }

    /// Kernel radius in pixels (how far from center the kernel reaches).
    pub fn kernel_radius(&self) -> f64 {
        match self {
            Self::Nearest => 0.5,
            Self::Bilinear => 1.0,
            Self::Bicubic => 2.0,
            Self::Lanczos3 => 3.0,
        }
    }

    /// Create an interpolator bound to `source`.
    ///
    /// Interpolators may keep per-instance caches, so every worker thread
    /// must own its own instance.
    pub fn new_interpolator<'a>(
        &self,
        source: ArrayView2<'a, f64>,
        unclipped: bool,
    ) -> Box<dyn Interpolator + 'a> {
        let nb = Neighborhood::new(source, unclipped);
        match self {
            Self::Nearest => Box::new(nearest::NearestInterpolator::new(nb)),
            Self::Bilinear => Box::new(bilinear::BilinearInterpolator::new(nb)),
            Self::Bicubic => Box::new(cubic::BicubicInterpolator::new(nb)),
            Self::Lanczos3 => Box::new(lanczos::LanczosInterpolator::new(nb)),
        }
    }
}

/// Samples a source buffer at fractional coordinates.
pub trait Interpolator: Send {
    fn interpolate(&mut self, x: f64, y: f64) -> f64;
}

/// Read access to a source buffer under the boundary policy.
///
/// Clipped: neighbours outside the source do not exist; kernels drop them and
/// renormalize the remaining weights. Unclipped: the source is extended
/// virtually by replicating its border pixels.
#[derive(Clone, Copy)]
pub struct Neighborhood<'a> {
    src: ArrayView2<'a, f64>,
    rows: isize,
    cols: isize,
    unclipped: bool,
}

impl<'a> Neighborhood<'a> {
    pub fn new(src: ArrayView2<'a, f64>, unclipped: bool) -> Self {
        let (rows, cols) = src.dim();
        Self {
            src,
            rows: rows as isize,
            cols: cols as isize,
            unclipped,
        }
    }

    pub fn rows(&self) -> isize {
        self.rows
    }

    pub fn cols(&self) -> isize {
        self.cols
    }

    /// Sample at integer pixel indices, `None` outside a clipped source.
    #[inline]
    pub fn fetch(&self, col: isize, row: isize) -> Option<f64> {
        if col >= 0 && col < self.cols && row >= 0 && row < self.rows {
            Some(self.src[(row as usize, col as usize)])
        } else if self.unclipped {
            Some(self.clamped(col, row))
        } else {
            None
        }
    }

    /// Sample with indices clamped to the source extent.
    #[inline]
    pub fn clamped(&self, col: isize, row: isize) -> f64 {
        let c = col.clamp(0, self.cols - 1) as usize;
        let r = row.clamp(0, self.rows - 1) as usize;
        self.src[(r, c)]
    }

    /// Separable weighted sum over the window anchored at `(col0, row0)`.
    ///
    /// If any neighbour is missing, the result is renormalized by the weights
    /// actually used; a vanishing weight sum falls back to the nearest pixel.
    pub fn convolve(&self, col0: isize, row0: isize, wx: &[f64], wy: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut used = 0.0;
        let mut skipped = false;
        for (j, &w_row) in wy.iter().enumerate() {
            let row = row0 + j as isize;
            for (i, &w_col) in wx.iter().enumerate() {
                let w = w_row * w_col;
                match self.fetch(col0 + i as isize, row) {
                    Some(v) => {
                        sum += w * v;
                        used += w;
                    }
                    None => skipped = true,
                }
            }
        }
        if !skipped {
            return sum;
        }
        if used.abs() < 1e-12 {
            let center = (wx.len() as isize - 1) / 2;
            return self.clamped(col0 + center, row0 + center);
        }
        sum / used
    }
}
