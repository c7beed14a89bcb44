//! Bicubic convolution kernel.

use super::{Interpolator, Neighborhood};

/// Keys cubic convolution weight with `a = -0.5`, zero beyond `|t| = 2`.
fn cubic_weight(t: f64) -> f64 {
    const A: f64 = -0.5;
    let t = t.abs();
    let (t2, t3) = (t * t, t * t * t);
    match t {
        t if t <= 1.0 => (A + 2.0) * t3 - (A + 3.0) * t2 + 1.0,
        t if t <= 2.0 => A * (t3 - 5.0 * t2 + 8.0 * t - 4.0),
        _ => 0.0,
    }
}

/// Bicubic interpolation over a 4×4 neighborhood centered on the sample point.
pub struct BicubicInterpolator<'a> {
    nb: Neighborhood<'a>,
}

impl<'a> BicubicInterpolator<'a> {
    pub fn new(nb: Neighborhood<'a>) -> Self {
        Self { nb }
    }
}

impl Interpolator for BicubicInterpolator<'_> {
    fn interpolate(&mut self, x: f64, y: f64) -> f64 {
        // Convert from corner-based to center-based coordinates
        let cx = x - 0.5;
        let cy = y - 0.5;

        let ix = cx.floor();
        let iy = cy.floor();
        let dx = cx - ix;
        let dy = cy - iy;

        // Offsets -1..+2 around the anchor
        let mut wx = [0.0; 4];
        let mut wy = [0.0; 4];
        for (k, offset) in (-1..=2).enumerate() {
            wx[k] = cubic_weight(dx - offset as f64);
            wy[k] = cubic_weight(dy - offset as f64);
        }

        self.nb
            .convolve(ix as isize - 1, iy as isize - 1, &wx, &wy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    #[test]
    fn test_weight_knots_and_symmetry() {
        for (t, w) in [(0.0, 1.0), (1.0, 0.0), (2.0, 0.0), (2.5, 0.0), (0.5, 0.5625), (1.5, -0.0625)] {
            assert_relative_eq!(cubic_weight(t), w, epsilon = 1e-12);
            assert_relative_eq!(cubic_weight(-t), w, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        for dx in [0.0, 0.1, 0.5, 0.9] {
            let sum: f64 = (-1..=2).map(|k| cubic_weight(dx - k as f64)).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_pixel_center_exact() {
        let mut arr = Array2::zeros((6, 6));
        for r in 0..6 {
            for c in 0..6 {
                arr[(r, c)] = (r * 6 + c) as f64;
            }
        }
        let mut it = BicubicInterpolator::new(Neighborhood::new(arr.view(), false));

        assert_relative_eq!(it.interpolate(3.5, 3.5), arr[(3, 3)], epsilon = 1e-10);
        // Corner pixel: most of the window is missing but the center weight is 1
        assert_relative_eq!(it.interpolate(0.5, 0.5), arr[(0, 0)], epsilon = 1e-10);
    }

    #[test]
    fn test_linear_gradient_preservation() {
        // Cubic should reproduce a linear gradient exactly in the interior
        let mut arr = Array2::zeros((8, 8));
        for r in 0..8 {
            for c in 0..8 {
                arr[(r, c)] = c as f64;
            }
        }
        let mut it = BicubicInterpolator::new(Neighborhood::new(arr.view(), false));

        assert_relative_eq!(it.interpolate(3.75, 3.5), 3.25, epsilon = 1e-10);
        assert_relative_eq!(it.interpolate(4.0, 3.5), 3.5, epsilon = 1e-10);
    }

    #[test]
    fn test_unclipped_border_extension() {
        // Constant rows: the replicated border keeps the value flat
        let mut arr = Array2::zeros((6, 6));
        for r in 0..6 {
            for c in 0..6 {
                arr[(r, c)] = r as f64;
            }
        }
        let mut it = BicubicInterpolator::new(Neighborhood::new(arr.view(), true));
        assert_relative_eq!(it.interpolate(0.3, 2.5), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_nan_propagation() {
        let mut arr = Array2::from_elem((6, 6), 1.0_f64);
        arr[(3, 3)] = f64::NAN;
        let mut it = BicubicInterpolator::new(Neighborhood::new(arr.view(), false));

        // The NaN pixel is inside the 4×4 neighborhood with non-zero weight
        assert!(it.interpolate(3.25, 3.25).is_nan());
    }
}
