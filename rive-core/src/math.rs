//! 2D vectors, affine matrices and bounding boxes.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// A point or vector in artboard space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2D {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Vec2D {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Affine transform stored as `[xx, xy, yx, yy, tx, ty]`.
///
/// A point maps as `x' = xx * x + yx * y + tx`, `y' = xy * x + yy * y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2D(pub [f32; 6]);

impl Default for Mat2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Pure translation.
    #[must_use]
    pub const fn from_translate(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// Pure (possibly non-uniform) scale.
    #[must_use]
    pub const fn from_scale(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Translate, then rotate (radians), then scale, composed in that order.
    #[must_use]
    pub fn from_components(x: f32, y: f32, rotation: f32, scale_x: f32, scale_y: f32) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self([
            cos * scale_x,
            sin * scale_x,
            -sin * scale_y,
            cos * scale_y,
            x,
            y,
        ])
    }

    /// Apply the transform to a point.
    #[must_use]
    pub fn transform_point(&self, point: Vec2D) -> Vec2D {
        let m = &self.0;
        Vec2D::new(
            m[0] * point.x + m[2] * point.y + m[4],
            m[1] * point.x + m[3] * point.y + m[5],
        )
    }

    /// The inverse transform, or `None` when the matrix is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let m = &self.0;
        let det = m[0] * m[3] - m[1] * m[2];
        if det.abs() < f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self([
            m[3] * inv,
            -m[1] * inv,
            -m[2] * inv,
            m[0] * inv,
            (m[2] * m[5] - m[3] * m[4]) * inv,
            (m[1] * m[4] - m[0] * m[5]) * inv,
        ]))
    }

    /// Translation component.
    #[must_use]
    pub fn translation(&self) -> Vec2D {
        Vec2D::new(self.0[4], self.0[5])
    }
}

impl Mul for Mat2D {
    type Output = Mat2D;

    /// `a * b` applies `b` first, then `a`.
    fn mul(self, rhs: Mat2D) -> Mat2D {
        let a = &self.0;
        let b = &rhs.0;
        Mat2D([
            a[0] * b[0] + a[2] * b[1],
            a[1] * b[0] + a[3] * b[1],
            a[0] * b[2] + a[2] * b[3],
            a[1] * b[2] + a[3] * b[3],
            a[0] * b[4] + a[2] * b[5] + a[4],
            a[1] * b[4] + a[3] * b[5] + a[5],
        ])
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum X.
    pub min_x: f32,
    /// Minimum Y.
    pub min_y: f32,
    /// Maximum X.
    pub max_x: f32,
    /// Maximum Y.
    pub max_y: f32,
}

impl Aabb {
    /// Box from origin and size.
    #[must_use]
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    /// Smallest box enclosing all points, `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2D>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in points {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Vec2D) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2D, b: Vec2D) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_multiply_applies_right_first() {
        let translate = Mat2D::from_translate(10.0, 0.0);
        let scale = Mat2D::from_scale(2.0, 2.0);
        let p = (translate * scale).transform_point(Vec2D::new(1.0, 1.0));
        assert!(approx(p, Vec2D::new(12.0, 2.0)));
    }

    #[test]
    fn test_invert_roundtrip() {
        let m = Mat2D::from_components(5.0, -3.0, 0.7, 2.0, 0.5);
        let inv = m.invert().expect("invertible");
        let p = Vec2D::new(3.0, 4.0);
        assert!(approx(inv.transform_point(m.transform_point(p)), p));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Mat2D::from_scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_aabb_contains() {
        let bounds = Aabb::from_xywh(0.0, 0.0, 10.0, 5.0);
        assert!(bounds.contains(Vec2D::new(10.0, 5.0)));
        assert!(!bounds.contains(Vec2D::new(10.1, 2.0)));
    }
}
