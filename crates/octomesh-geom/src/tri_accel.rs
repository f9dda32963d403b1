//! Wald-style accelerated triangle.
//!
//! The triangle's plane is stored projected onto the two axes orthogonal to
//! its dominant normal axis, so a ray test is a handful of multiply-adds and
//! one division. The test has no epsilon slack: rays grazing an edge or a
//! vertex may be rejected, and callers needing robustness fall back to
//! [`crate::intersect::ray_triangle`].

use octomesh_math::{cyclic_axes, dominant_axis, Point3};
use thiserror::Error;

use crate::Ray;

/// A triangle has zero area when projected onto its dominant plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("degenerate triangle: zero projected area")]
pub struct Degenerate;

/// Precomputed ray-intersection record for one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriAccel {
    /// Dominant normal axis (0..=2), or [`TriAccel::DEGENERATE_AXIS`].
    pub dominant_axis: u8,
    /// Plane normal `u` component divided by the dominant component.
    pub n_u: f64,
    /// Plane normal `v` component divided by the dominant component.
    pub n_v: f64,
    /// Plane offset divided by the dominant component.
    pub n_d: f64,
    /// First vertex, `u` component.
    pub a_u: f64,
    /// First vertex, `v` component.
    pub a_v: f64,
    /// Projected edge `v2 - v0`, scaled for the second vertex's weight.
    pub b_nu: f64,
    /// Projected edge `v2 - v0`, scaled for the second vertex's weight.
    pub b_nv: f64,
    /// Projected edge `v1 - v0`, scaled for the third vertex's weight.
    pub c_nu: f64,
    /// Projected edge `v1 - v0`, scaled for the third vertex's weight.
    pub c_nv: f64,
}

impl TriAccel {
    /// Axis value marking a record that never reports a hit.
    pub const DEGENERATE_AXIS: u8 = 3;

    /// Precompute the record for triangle `(v0, v1, v2)`.
    pub fn build(v0: &Point3, v1: &Point3, v2: &Point3) -> Result<Self, Degenerate> {
        let b = v2 - v0;
        let c = v1 - v0;
        let n = b.cross(&c);

        let k = dominant_axis(&n);
        let (u, v) = cyclic_axes(k);

        // Equal to n[k]; zero means the triangle projects to a segment
        let denom = b[u] * c[v] - b[v] * c[u];
        if denom == 0.0 || !denom.is_finite() {
            return Err(Degenerate);
        }

        let nk = n[k];
        Ok(Self {
            dominant_axis: k as u8,
            n_u: n[u] / nk,
            n_v: n[v] / nk,
            n_d: n.dot(&v0.coords) / nk,
            a_u: v0[u],
            a_v: v0[v],
            b_nu: b[u] / denom,
            b_nv: -b[v] / denom,
            c_nu: c[v] / denom,
            c_nv: -c[u] / denom,
        })
    }

    /// The sentinel record stored for triangles that failed [`TriAccel::build`].
    pub const fn degenerate() -> Self {
        Self {
            dominant_axis: Self::DEGENERATE_AXIS,
            n_u: 0.0,
            n_v: 0.0,
            n_d: 0.0,
            a_u: 0.0,
            a_v: 0.0,
            b_nu: 0.0,
            b_nv: 0.0,
            c_nu: 0.0,
            c_nv: 0.0,
        }
    }

    /// Whether this is the sentinel record.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.dominant_axis >= Self::DEGENERATE_AXIS
    }

    /// Intersect a ray, accepting parameters in `[t_min, t_max]`.
    ///
    /// Returns `(t, u, v)` where `u` and `v` are the barycentric weights of
    /// the second and third vertex. Degenerate records always miss.
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, f64, f64)> {
        if self.is_degenerate() {
            return None;
        }

        let k = self.dominant_axis as usize;
        let (u, v) = cyclic_axes(k);
        let org = &ray.origin;
        let dir = &ray.direction;

        let nd = dir[k] + self.n_u * dir[u] + self.n_v * dir[v];
        if nd == 0.0 {
            return None;
        }

        let t = (self.n_d - org[k] - self.n_u * org[u] - self.n_v * org[v]) / nd;
        if !(t >= t_min && t <= t_max) {
            return None;
        }

        let hu = org[u] + t * dir[u] - self.a_u;
        let hv = org[v] + t * dir[v] - self.a_v;

        let beta = hv * self.b_nu + hu * self.b_nv;
        if beta < 0.0 {
            return None;
        }
        let gamma = hu * self.c_nu + hv * self.c_nv;
        if gamma < 0.0 || beta + gamma > 1.0 {
            return None;
        }

        Some((t, beta, gamma))
    }
}

/// Which intersection tier a triangle supports.
///
/// Triangles with a valid [`TriAccel`] take the fast path; degenerate ones
/// are only reachable through the robust test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleTest {
    /// Fast projected-plane test available.
    FastHit(TriAccel),
    /// Only the robust Möller–Trumbore test applies.
    RobustOnly,
}

impl TriangleTest {
    /// Classify triangle `(v0, v1, v2)`.
    pub fn new(v0: &Point3, v1: &Point3, v2: &Point3) -> Self {
        match TriAccel::build(v0, v1, v2) {
            Ok(accel) => Self::FastHit(accel),
            Err(Degenerate) => Self::RobustOnly,
        }
    }

    /// The accelerated record, or the degenerate sentinel.
    pub fn accel(&self) -> TriAccel {
        match self {
            Self::FastHit(accel) => *accel,
            Self::RobustOnly => TriAccel::degenerate(),
        }
    }

    /// Whether the fast test can be used.
    pub fn is_fast(&self) -> bool {
        matches!(self, Self::FastHit(_))
    }

    /// Fast intersection; always `None` for [`TriangleTest::RobustOnly`].
    #[inline]
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, f64, f64)> {
        match self {
            Self::FastHit(accel) => accel.intersect(ray, t_min, t_max),
            Self::RobustOnly => None,
        }
    }
}
