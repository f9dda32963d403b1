#![warn(missing_docs)]

//! Math types for the octomesh triangle index.
//!
//! Thin wrappers around nalgebra: points, vectors and unit directions in
//! double precision, a few axis-indexed helpers used by the slab and
//! projection tests, and the tolerance constants shared by the
//! intersection routines.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Index of the component with the largest magnitude (0 = x, 1 = y, 2 = z).
///
/// Ties resolve toward the lower axis.
#[inline]
pub fn dominant_axis(v: &Vec3) -> usize {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// The two axes orthogonal to `axis`, in cyclic order.
///
/// `(axis + 1) % 3, (axis + 2) % 3`, so the projected basis keeps the
/// handedness of the original frame.
#[inline]
pub fn cyclic_axes(axis: usize) -> (usize, usize) {
    const MODULO: [usize; 5] = [0, 1, 2, 0, 1];
    (MODULO[axis + 1], MODULO[axis + 2])
}

/// Component-wise minimum of two points.
#[inline]
pub fn point_min(a: &Point3, b: &Point3) -> Point3 {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

/// Component-wise maximum of two points.
#[inline]
pub fn point_max(a: &Point3, b: &Point3) -> Point3 {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

/// Point halfway between `a` and `b`.
#[inline]
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    nalgebra::center(a, b)
}

/// Tolerance constants for the intersection routines.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Determinant and barycentric slack for the robust ray/triangle test.
    pub intersection: f64,
    /// Thickness applied to rays on the robust fallback pass.
    pub fallback_thickness: f64,
}

impl Tolerance {
    /// Default tolerances (`1e-7` intersection slack, `0.01` fallback thickness).
    pub const DEFAULT: Self = Self {
        intersection: 1e-7,
        fallback_thickness: 0.01,
    };

    /// Check if a determinant is too small to divide by.
    pub fn is_parallel(&self, det: f64) -> bool {
        det.abs() < self.intersection
    }

    /// Check if a barycentric coordinate lies in `[-eps, 1 + eps]`.
    pub fn in_unit_range(&self, w: f64) -> bool {
        w >= -self.intersection && w <= 1.0 + self.intersection
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
