//! Lanczos-3 kernel over a 6x6 window with weights normalized to unit sum.

use std::f64::consts::PI;

use super::{Interpolator, Neighborhood};

const LOBES: f64 = 3.0;

/// Windowed sinc `sinc(t) * sinc(t / 3)`, zero outside `(-3, 3)`.
fn lanczos_weight(t: f64) -> f64 {
    let t = t.abs();
    if t >= LOBES {
        return 0.0;
    }
    if t < 1e-12 {
        return 1.0;
    }
    let pt = PI * t;
    LOBES * pt.sin() * (pt / LOBES).sin() / (pt * pt)
}

/// Fill `w` with the six normalized weights for fractional offset `d`.
fn lanczos_weights(d: f64, w: &mut [f64; 6]) {
    for (k, offset) in (-2..=3_isize).enumerate() {
        w[k] = lanczos_weight(d - offset as f64);
    }
    let sum: f64 = w.iter().sum();
    if sum.abs() > 1e-15 {
        for v in w.iter_mut() {
            *v /= sum;
        }
    }
}

/// Lanczos-3 interpolation.
///
/// Row weights are cached: consecutive samples on the same source row reuse
/// them, which is the common access pattern of the warp engine.
pub struct LanczosInterpolator<'a> {
    nb: Neighborhood<'a>,
    wx: [f64; 6],
    wy: [f64; 6],
    cached_dy: f64,
}

impl<'a> LanczosInterpolator<'a> {
    pub fn new(nb: Neighborhood<'a>) -> Self {
        Self {
            nb,
            wx: [0.0; 6],
            wy: [0.0; 6],
            cached_dy: f64::NAN,
        }
    }
}

impl Interpolator for LanczosInterpolator<'_> {
    fn interpolate(&mut self, x: f64, y: f64) -> f64 {
        // Convert from corner-based to center-based coordinates
        let cx = x - 0.5;
        let cy = y - 0.5;

        let ix = cx.floor();
        let iy = cy.floor();
        let dx = cx - ix;
        let dy = cy - iy;

        lanczos_weights(dx, &mut self.wx);
        if dy != self.cached_dy {
            lanczos_weights(dy, &mut self.wy);
            self.cached_dy = dy;
        }

        self.nb
            .convolve(ix as isize - 2, iy as isize - 2, &self.wx, &self.wy)
    }
}
