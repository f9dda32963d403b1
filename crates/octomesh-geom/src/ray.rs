//! Ray representation and the slab test used by box queries.

use octomesh_math::{Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// Rays are cheap value types: queries that need a different thickness
/// build a new ray with [`Ray::with_thickness`] rather than mutating one.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Radius by which box tests are fattened (0 = infinitely thin ray).
    pub thickness: f64,
    /// Caller tag carried through queries untouched.
    pub index: i32,
    /// Precomputed reciprocal of direction components for slab tests.
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized. A zero direction produces a ray
    /// that intersects nothing.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let dir = Dir3::try_new(direction, 0.0)
            .unwrap_or_else(|| Dir3::new_unchecked(Vec3::zeros()));
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        Self {
            origin,
            direction: dir,
            thickness: 0.0,
            index: 0,
            inv_direction: inv,
        }
    }

    /// Create a ray from `from` toward `to`.
    pub fn between(from: Point3, to: Point3) -> Self {
        Self::new(from, to - from)
    }

    /// Copy of this ray with a different thickness.
    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness.max(0.0);
        self
    }

    /// Copy of this ray carrying a caller tag.
    pub fn with_index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Whether the direction collapsed to zero at construction.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction.x == 0.0 && self.direction.y == 0.0 && self.direction.z == 0.0
    }

    /// Intersect the ray with the box spanned by `min` and `max`.
    ///
    /// Returns `Some((t_min, t_max))` with `t_min` clamped to zero when the
    /// ray enters the box at or ahead of its origin, `None` if the slabs
    /// don't overlap or the box lies entirely behind the ray. Touching
    /// counts as a hit.
    ///
    /// Axes where the direction is zero never divide: the ray is parallel
    /// to that slab and only needs its origin between the two planes.
    pub fn slab_interval(&self, min: &Point3, max: &Point3) -> Option<(f64, f64)> {
        if self.is_degenerate() {
            return None;
        }

        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in 0..3 {
            let o = self.origin[axis];
            if self.direction[axis] == 0.0 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            let inv = self.inv_direction[axis];
            let mut t0 = (min[axis] - o) * inv;
            let mut t1 = (max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some((t_min.max(0.0), t_max))
    }
}
