//! Bilinear interpolation kernel.

use super::{Interpolator, Neighborhood};

/// Bilinear interpolation over a 2x2 neighborhood.
///
/// Subtracts 0.5 from input coordinates to center on pixel centers
/// (pixel center at col+0.5, row+0.5).
pub struct BilinearInterpolator<'a> {
    nb: Neighborhood<'a>,
}

impl<'a> BilinearInterpolator<'a> {
    pub fn new(nb: Neighborhood<'a>) -> Self {
        Self { nb }
    }
}

impl Interpolator for BilinearInterpolator<'_> {
    fn interpolate(&mut self, x: f64, y: f64) -> f64 {
        // Convert from corner-based to center-based coordinates
        let cx = x - 0.5;
        let cy = y - 0.5;

        let x0 = cx.floor();
        let y0 = cy.floor();
        let dx = cx - x0;
        let dy = cy - y0;

        self.nb.convolve(
            x0 as isize,
            y0 as isize,
            &[1.0 - dx, dx],
            &[1.0 - dy, dy],
        )
    }
}
