//! Nearest-neighbor interpolation kernel.

use super::{Interpolator, Neighborhood};

/// Nearest-neighbor interpolation.
///
/// Corner-based pixel convention: pixel (0,0) has its upper-left corner at
/// coordinate (0.0, 0.0) and its center at (0.5, 0.5), so the containing pixel
/// is simply `floor()`. Coordinates outside the source read the closest border
/// pixel.
pub struct NearestInterpolator<'a> {
    nb: Neighborhood<'a>,
}

impl<'a> NearestInterpolator<'a> {
    pub fn new(nb: Neighborhood<'a>) -> Self {
        Self { nb }
    }
}

impl Interpolator for NearestInterpolator<'_> {
    fn interpolate(&mut self, x: f64, y: f64) -> f64 {
        self.nb.clamped(x.floor() as isize, y.floor() as isize)
    }
}
