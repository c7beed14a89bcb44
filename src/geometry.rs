//! Double-precision points and rectangles shared by the projection and warp layers.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A pair of double-precision coordinates.
///
/// Depending on context this is an image pixel position (corner-based, pixel
/// `(c, r)` centered at `(c + 0.5, r + 0.5)`), a celestial position (RA, Dec in
/// degrees), a native spherical position (phi, theta in degrees) or a
/// world-plane position (degrees).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DPoint {
    pub x: f64,
    pub y: f64,
}

impl DPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: DPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for DPoint {
    type Output = DPoint;

    fn add(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for DPoint {
    type Output = DPoint;

    fn sub(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for DPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl DRect {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle covering a whole `width x height` image.
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    /// An inverted rectangle that any call to `union_point` will replace.
    pub fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn is_valid(&self) -> bool {
        self.x1 >= self.x0 && self.y1 >= self.y0
    }

    pub fn contains(&self, p: DPoint) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }

    /// True if `other` lies entirely within this rectangle (closed bounds).
    pub fn contains_rect(&self, other: &DRect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Grow the rectangle so that it encloses `p`.
    pub fn union_point(&mut self, p: DPoint) {
        self.x0 = self.x0.min(p.x);
        self.y0 = self.y0.min(p.y);
        self.x1 = self.x1.max(p.x);
        self.y1 = self.y1.max(p.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = DRect::from_size(4, 3);
        assert!(r.contains(DPoint::new(0.0, 0.0)));
        assert!(r.contains(DPoint::new(3.999, 2.999)));
        assert!(!r.contains(DPoint::new(4.0, 1.0)));
        assert!(!r.contains(DPoint::new(1.0, 3.0)));
        assert!(!r.contains(DPoint::new(f64::NAN, 1.0)));
    }

    #[test]
    fn test_union_point() {
        let mut r = DRect::empty();
        assert!(!r.is_valid());
        r.union_point(DPoint::new(2.0, -1.0));
        r.union_point(DPoint::new(-3.0, 5.0));
        assert_eq!(r, DRect::new(-3.0, -1.0, 2.0, 5.0));
        assert_eq!(r.width(), 5.0);
        assert_eq!(r.height(), 6.0);
    }
}
