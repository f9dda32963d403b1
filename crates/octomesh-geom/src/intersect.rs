//! Robust ray/triangle intersection (Möller–Trumbore).
//!
//! Slower than [`crate::TriAccel`] but tolerant at edges and vertices, and
//! it handles triangles whose accelerated record is degenerate.

use octomesh_math::Tolerance;

use crate::{FaceIndex, HitResult, Ray, Triangle};

/// Intersect `ray` with `triangle` using the default tolerance.
///
/// Hits behind the ray origin (`t < 0`) are rejected unless `allow_back`
/// is set.
pub fn ray_triangle(
    ray: &Ray,
    triangle: &Triangle,
    face_index: FaceIndex,
    allow_back: bool,
) -> Option<HitResult> {
    ray_triangle_with(ray, triangle, face_index, allow_back, &Tolerance::DEFAULT)
}

/// Intersect `ray` with `triangle` using an explicit tolerance.
pub fn ray_triangle_with(
    ray: &Ray,
    triangle: &Triangle,
    face_index: FaceIndex,
    allow_back: bool,
    tol: &Tolerance,
) -> Option<HitResult> {
    let [v0, v1, v2] = triangle;
    let dir = ray.direction.as_ref();

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = dir.cross(&edge2);
    let det = edge1.dot(&p);
    if tol.is_parallel(det) {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - v0;
    let u = s.dot(&p) * inv_det;
    if !tol.in_unit_range(u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = dir.dot(&q) * inv_det;
    if v < -tol.intersection || u + v > 1.0 + tol.intersection {
        return None;
    }

    let t = edge2.dot(&q) * inv_det;
    if !allow_back && t < 0.0 {
        return None;
    }

    Some(HitResult::new(t, u, v, face_index))
}
