//! Axis-aligned bounding box stored as center and half extent.
//!
//! The octree only ever builds cubes, but nothing here assumes it. Corners
//! are cached next to the center form so the slab test doesn't rebuild
//! them per ray.

use octomesh_math::{midpoint, point_max, point_min, Point3, Vec3};

use crate::{Ray, Triangle};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAlignedBox {
    center: Point3,
    half_extent: Vec3,
    min: Point3,
    max: Point3,
}

impl AxisAlignedBox {
    /// Create a box from its center and per-axis half widths.
    ///
    /// Negative half widths are taken by magnitude.
    pub fn new(center: Point3, half_extent: Vec3) -> Self {
        let half_extent = half_extent.abs();
        Self {
            center,
            half_extent,
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Create a box from two opposite corners, in any order.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        let min = point_min(&a, &b);
        let max = point_max(&a, &b);
        let center = midpoint(&min, &max);
        Self::new(center, max - center)
    }

    /// Smallest box enclosing every vertex of `triangles`.
    ///
    /// Returns `None` for an empty slice, which has no meaningful bounds.
    pub fn from_triangles(triangles: &[Triangle]) -> Option<Self> {
        let first = triangles.first()?;
        let mut min = first[0];
        let mut max = first[0];
        for tri in triangles {
            for p in tri {
                min = point_min(&min, p);
                max = point_max(&max, p);
            }
        }
        Some(Self::from_corners(min, max))
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Per-axis half widths.
    #[inline]
    pub fn half_extent(&self) -> &Vec3 {
        &self.half_extent
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> &Point3 {
        &self.min
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> &Point3 {
        &self.max
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        2.0 * self.half_extent.norm()
    }

    /// The eight corners, indexed by octant bits (bit 0 = +x, bit 1 = +y, bit 2 = +z).
    pub fn corners(&self) -> [Point3; 8] {
        std::array::from_fn(|octant| {
            let s = octant_signs(octant);
            self.center + self.half_extent.component_mul(&s)
        })
    }

    /// Cube with the same center whose half width is the largest half
    /// width of this box, scaled by `factor`.
    pub fn scaled_cubic(&self, factor: f64) -> Self {
        let h = self.half_extent.max() * factor;
        Self::new(self.center, Vec3::new(h, h, h))
    }

    /// One of the eight sub-boxes of half the size.
    ///
    /// Octant bits select the side per axis (bit 0 = +x, bit 1 = +y,
    /// bit 2 = +z); the child is centered at `center + sign * half / 2`.
    pub fn child(&self, octant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let s = octant_signs(octant);
        Self::new(self.center + quarter.component_mul(&s), quarter)
    }

    /// Strict point containment: `|center[i] - p[i]| < half_extent[i]` on every axis.
    ///
    /// Points on a face are outside.
    pub fn contains_point(&self, p: &Point3) -> bool {
        (0..3).all(|i| (self.center[i] - p[i]).abs() < self.half_extent[i])
    }

    /// Conservative sphere test: per-axis center distance below `radius + half_extent`.
    ///
    /// May report overlap for spheres near a box corner that don't touch it.
    pub fn intersects_sphere(&self, center: &Point3, radius: f64) -> bool {
        (0..3).all(|i| (self.center[i] - center[i]).abs() < radius + self.half_extent[i])
    }

    /// Whether the ray passes through the box, fattened by the ray's thickness.
    pub fn intersects(&self, ray: &Ray) -> bool {
        self.ray_interval(ray).is_some()
    }

    /// Entry and exit parameters of the ray through the fattened box.
    ///
    /// The corners are pushed outward along the center-to-corner direction
    /// by `ray.thickness`, which approximates a thick ray against the
    /// original box.
    pub fn ray_interval(&self, ray: &Ray) -> Option<(f64, f64)> {
        // Each corner sits half a diagonal away from the center
        let corner_distance = 0.5 * self.diagonal();
        if ray.thickness > 0.0 && corner_distance > 0.0 {
            let offset = self.half_extent * (ray.thickness / corner_distance);
            ray.slab_interval(&(self.min - offset), &(self.max + offset))
        } else {
            ray.slab_interval(&self.min, &self.max)
        }
    }

    /// Separating-axis overlap test against a triangle (Akenine-Möller).
    ///
    /// Tests the 9 edge/box-axis cross products, the 3 box face normals and
    /// the triangle plane. Touching counts as overlap, so a triangle lying
    /// on a shared face between two boxes belongs to both.
    pub fn overlaps_triangle(&self, a: &Point3, b: &Point3, c: &Point3) -> bool {
        let h = &self.half_extent;
        let v = [a - self.center, b - self.center, c - self.center];
        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

        // Edge x box axis
        for edge in &edges {
            for axis in 0..3 {
                let l = Vec3::ith(axis, 1.0).cross(edge);
                let p0 = v[0].dot(&l);
                let p1 = v[1].dot(&l);
                let p2 = v[2].dot(&l);
                let r = h.x * l.x.abs() + h.y * l.y.abs() + h.z * l.z.abs();
                if p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r {
                    return false;
                }
            }
        }

        // Box face normals
        for axis in 0..3 {
            let lo = v[0][axis].min(v[1][axis]).min(v[2][axis]);
            let hi = v[0][axis].max(v[1][axis]).max(v[2][axis]);
            if lo > h[axis] || hi < -h[axis] {
                return false;
            }
        }

        // Triangle plane
        let normal = edges[0].cross(&edges[1]);
        plane_overlaps_box(&normal, &v[0], h)
    }
}

/// Plane through `vertex` with `normal` against a box of half extent `h` at the origin.
fn plane_overlaps_box(normal: &Vec3, vertex: &Vec3, h: &Vec3) -> bool {
    let mut v_min = Vec3::zeros();
    let mut v_max = Vec3::zeros();
    for q in 0..3 {
        if normal[q] > 0.0 {
            v_min[q] = -h[q] - vertex[q];
            v_max[q] = h[q] - vertex[q];
        } else {
            v_min[q] = h[q] - vertex[q];
            v_max[q] = -h[q] - vertex[q];
        }
    }
    if normal.dot(&v_min) > 0.0 {
        return false;
    }
    normal.dot(&v_max) >= 0.0
}

/// `±1` per axis from octant bits.
fn octant_signs(octant: usize) -> Vec3 {
    let sign = |bit: usize| if octant & bit != 0 { 1.0 } else { -1.0 };
    Vec3::new(sign(1), sign(2), sign(4))
}
