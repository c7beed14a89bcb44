use crate::geometry::DPoint;

/// A 2D affine transform.
///
/// Maps (col, row) to (x, y):
///   x = a * col + b * row + c
///   y = d * col + e * row + f
///
/// Used both as the pixel -> world-plane part of an astrometric solution and
/// as the destination -> source coordinate law of the affine transformations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 0.0, dx, 0.0, 1.0, dy)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Counter-clockwise rotation by `angle` radians (y axis pointing down),
    /// expressed as the inverse map: a point relative to `dst_center` is sent
    /// to the point relative to `src_center` that lands on it.
    pub fn rotation_about(angle: f64, src_center: DPoint, dst_center: DPoint) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::new(
            cos_a,
            -sin_a,
            src_center.x - cos_a * dst_center.x + sin_a * dst_center.y,
            sin_a,
            cos_a,
            src_center.y - sin_a * dst_center.x - cos_a * dst_center.y,
        )
    }

    /// Apply the forward transform: (col, row) -> (x, y).
    pub fn forward(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.a * col + self.b * row + self.c;
        let y = self.d * col + self.e * row + self.f;
        (x, y)
    }

    pub fn forward_point(&self, p: DPoint) -> DPoint {
        self.forward(p.x, p.y).into()
    }

    /// Composition: the returned transform applies `self` first, then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        Affine {
            a: next.a * self.a + next.b * self.d,
            b: next.a * self.b + next.b * self.e,
            c: next.a * self.c + next.b * self.f + next.c,
            d: next.d * self.a + next.e * self.d,
            e: next.d * self.b + next.e * self.e,
            f: next.d * self.c + next.e * self.f + next.f,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Compute the inverse affine transform.
    pub fn inverse(&self) -> Result<Affine, crate::error::WarpError> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return Err(crate::error::WarpError::Affine(
                "Singular affine transform (determinant is zero)".into(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }
}
