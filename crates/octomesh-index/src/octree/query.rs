//! Point, sphere and ray queries.

use std::collections::BTreeSet;

use octomesh_geom::{intersect, AxisAlignedBox, FaceIndex, HitResult, Ray};
use octomesh_math::{Point3, Tolerance};

use super::{NodeId, Octree};

/// Set of face indices returned by the broad-phase queries, in ascending order.
pub type FaceSet = BTreeSet<FaceIndex>;

impl Octree {
    /// Faces referenced by the leaves whose cube strictly contains `p`.
    ///
    /// Empty when `p` is outside the root or sits exactly on a splitting
    /// plane, since no child strictly contains it.
    pub fn query_point(&self, p: &Point3) -> FaceSet {
        self.collect_leaf_refs(|bbox| bbox.contains_point(p))
    }

    /// Faces referenced by the leaves whose cube meets the sphere.
    ///
    /// Uses the conservative per-axis box test, so faces near a leaf
    /// corner may be reported without touching the sphere.
    pub fn query_sphere(&self, center: &Point3, radius: f64) -> FaceSet {
        self.collect_leaf_refs(|bbox| bbox.intersects_sphere(center, radius))
    }

    /// Faces referenced by the leaves the ray passes through.
    ///
    /// Box tests are fattened by `ray.thickness`. With `full_exact` the set
    /// is narrowed to faces the robust test hits in front of the origin.
    pub fn query_ray_candidates(&self, ray: &Ray, full_exact: bool) -> FaceSet {
        let mut faces = self.collect_leaf_refs(|bbox| bbox.intersects(ray));
        if full_exact {
            faces.retain(|&f| {
                intersect::ray_triangle(ray, &self.triangles[f], f, false).is_some()
            });
        }
        faces
    }

    /// Nearest hit along the ray.
    ///
    /// Runs the exact fast test against a thin ray first. If that finds
    /// nothing, which happens for rays through edges, vertices or
    /// degenerate triangles, it retries with a thick ray and the robust
    /// test. Returns [`HitResult::miss`] when both passes come up empty.
    /// Equal distances resolve to the lowest face index.
    pub fn closest_hit(&self, ray: &Ray) -> HitResult {
        let thin = ray.with_thickness(0.0);
        let mut best = HitResult::miss();
        for f in self.query_ray_candidates(&thin, false) {
            if let Some((t, u, v)) = self.tests[f].intersect(&thin, 0.0, best.distance) {
                best = best.closer(HitResult::new(t, u, v, f));
            }
        }
        if best.hit {
            return best;
        }

        let thick = ray.with_thickness(Tolerance::DEFAULT.fallback_thickness);
        let candidates = self.query_ray_candidates(&thick, false);
        tracing::trace!(
            ray = ray.index,
            candidates = candidates.len(),
            "fast pass missed, using robust test"
        );
        candidates
            .into_iter()
            .filter_map(|f| intersect::ray_triangle(&thick, &self.triangles[f], f, false))
            .fold(best, HitResult::closer)
    }

    /// Nearest hit point along the ray and the face it lies on.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<(Point3, FaceIndex)> {
        let hit = self.closest_hit(ray);
        let face = hit.face_index?;
        Some((ray.at(hit.distance), face))
    }

    /// Every face the ray hits in front of its origin, nearest first.
    ///
    /// Uses the robust test throughout, so a ray through a shared edge
    /// reports each adjacent face.
    pub fn intersect_all(&self, ray: &Ray) -> Vec<HitResult> {
        let thickness = ray.thickness.max(Tolerance::DEFAULT.fallback_thickness);
        let thick = ray.with_thickness(thickness);

        let mut hits: Vec<HitResult> = self
            .query_ray_candidates(&thick, false)
            .into_iter()
            .filter_map(|f| intersect::ray_triangle(ray, &self.triangles[f], f, false))
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.face_index.cmp(&b.face_index))
        });
        hits
    }

    /// Walk down from the root into every child whose cube passes `descend`
    /// and gather the triangle lists of the leaves reached.
    fn collect_leaf_refs<F>(&self, descend: F) -> FaceSet
    where
        F: Fn(&AxisAlignedBox) -> bool,
    {
        let mut faces = FaceSet::new();
        if !descend(self.root().bounding_box()) {
            return faces;
        }

        let mut stack: Vec<NodeId> = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            match node.children() {
                None => faces.extend(node.triangle_refs().iter().copied()),
                Some(children) => stack.extend(
                    children
                        .iter()
                        .copied()
                        .filter(|c| descend(self.nodes[c.index()].bounding_box())),
                ),
            }
        }
        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::IndexedMesh;
    use approx::assert_relative_eq;
    use octomesh_geom::Triangle;
    use octomesh_math::Vec3;

    fn sphere_tree() -> Octree {
        Octree::with_max_triangles(&IndexedMesh::uv_sphere(1.0, 16, 8), 8).unwrap()
    }

    /// Rays from outside the unit sphere aimed near its center.
    fn probe_rays() -> Vec<Ray> {
        let mut rays = Vec::new();
        for i in 0..24 {
            let a = i as f64 * 0.37;
            let origin = Point3::new(3.0 * a.cos(), 3.0 * a.sin(), 0.7 * (a * 1.3).sin());
            let target = Point3::new(0.11 * (a * 2.1).cos(), 0.13 * a.sin(), 0.09);
            rays.push(Ray::between(origin, target).with_index(i));
        }
        rays
    }

    fn brute_force_hits(tree: &Octree, ray: &Ray) -> Vec<HitResult> {
        (0..tree.face_count())
            .filter_map(|f| intersect::ray_triangle(ray, tree.triangle(f).unwrap(), f, false))
            .collect()
    }

    #[test]
    fn test_point_query_covers_surface_points() {
        let tree = sphere_tree();
        let root = tree.root().bounding_box();
        for f in 0..tree.face_count() {
            let [a, b, c] = tree.triangle(f).unwrap();
            let p = Point3::from(a.coords * 0.2 + b.coords * 0.3 + c.coords * 0.5);
            assert!(root.contains_point(&p));
            assert!(tree.query_point(&p).contains(&f), "face {f} missing at {p}");
        }
    }

    #[test]
    fn test_point_query_outside_root() {
        let tree = sphere_tree();
        assert!(tree.query_point(&Point3::new(5.0, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn test_sphere_query_covers_nearby_vertices() {
        let tree = sphere_tree();
        let center = Point3::new(0.6, 0.5, 0.4);
        let radius = 0.35;
        let found = tree.query_sphere(&center, radius);
        assert!(!found.is_empty());

        for f in 0..tree.face_count() {
            let tri = tree.triangle(f).unwrap();
            if tri.iter().any(|v| (v - center).norm() < radius) {
                assert!(found.contains(&f), "face {f}");
            }
        }

        assert!(tree.query_sphere(&Point3::new(10.0, 10.0, 10.0), 0.5).is_empty());
    }

    #[test]
    fn test_ray_candidates_superset_of_hits() {
        let tree = sphere_tree();
        for ray in probe_rays() {
            let candidates = tree.query_ray_candidates(&ray, false);
            let expected: FaceSet = brute_force_hits(&tree, &ray)
                .iter()
                .filter_map(|h| h.face_index)
                .collect();
            assert!(!expected.is_empty());
            assert!(expected.is_subset(&candidates), "ray {}", ray.index);
            assert_eq!(tree.query_ray_candidates(&ray, true), expected);
        }
    }

    #[test]
    fn test_ray_missing_root_has_no_candidates() {
        let tree = sphere_tree();
        let ray = Ray::new(Point3::new(5.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(tree.query_ray_candidates(&ray, false).is_empty());
        assert!(tree.closest_intersection(&ray).is_none());
    }

    #[test]
    fn test_closest_matches_brute_force() {
        let tree = sphere_tree();
        for ray in probe_rays() {
            let nearest = brute_force_hits(&tree, &ray)
                .into_iter()
                .fold(HitResult::miss(), HitResult::closer);
            let hit = tree.closest_hit(&ray);
            assert!(hit.hit);
            assert_relative_eq!(hit.distance, nearest.distance, epsilon = 1e-9);

            let (point, face) = tree.closest_intersection(&ray).unwrap();
            assert_relative_eq!(point, ray.at(nearest.distance), epsilon = 1e-9);
            // The reported point lies on the reported face
            let on_face = intersect::ray_triangle(&ray, tree.triangle(face).unwrap(), face, false);
            assert!(on_face.is_some());
        }
    }

    #[test]
    fn test_single_hit_triangle_is_returned() {
        let soup: Vec<Triangle> = vec![
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [
                Point3::new(3.0, 3.0, 1.0),
                Point3::new(4.0, 3.0, 1.0),
                Point3::new(3.0, 4.0, 1.0),
            ],
        ];
        let tree = Octree::with_max_triangles(&soup, 1).unwrap();
        let ray = Ray::new(Point3::new(0.25, 0.25, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let (point, face) = tree.closest_intersection(&ray).unwrap();
        assert_eq!(face, 0);
        assert_relative_eq!(point, Point3::new(0.25, 0.25, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_fallback_catches_grazing_ray() {
        let soup: Vec<Triangle> = vec![[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]];
        let tree = Octree::with_max_triangles(&soup, 4).unwrap();
        // Just outside the y = 0 edge: the exact test rejects, the robust one accepts
        let ray = Ray::new(Point3::new(0.5, -5e-8, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tree.triangle_test(0).unwrap().intersect(&ray, 0.0, f64::INFINITY).is_none());

        let (point, face) = tree.closest_intersection(&ray).unwrap();
        assert_eq!(face, 0);
        assert_relative_eq!(point, Point3::new(0.5, -5e-8, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_is_never_hit() {
        let mesh = IndexedMesh::new(
            vec![
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(6.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 4]],
        );
        let tree = Octree::with_max_triangles(&mesh, 1).unwrap();
        assert_eq!(tree.stats().degenerate_triangles, 1);

        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tree.query_ray_candidates(&ray, false).contains(&1));
        assert!(tree.closest_intersection(&ray).is_none());
        assert!(tree.intersect_all(&ray).is_empty());
    }

    #[test]
    fn test_zero_direction_ray_hits_nothing() {
        let tree = sphere_tree();
        let ray = Ray::new(Point3::new(2.0, 0.0, 0.0), Vec3::zeros());
        assert!(tree.query_ray_candidates(&ray, false).is_empty());
        assert!(tree.closest_intersection(&ray).is_none());
    }

    #[test]
    fn test_unit_cube_scenario() {
        let tree = Octree::with_max_triangles(&IndexedMesh::cube(1.0), 4).unwrap();

        // The origin lies on all three root splitting planes
        assert!(tree.query_point(&Point3::origin()).is_empty());

        // A point on the +x face falls in a leaf holding that face
        assert!(tree.query_point(&Point3::new(1.0, 0.3, 0.2)).contains(&2));

        let ray = Ray::between(Point3::new(2.0, 2.0, 2.0), Point3::origin());
        let corner_faces: FaceSet = [2, 3, 6, 7, 10, 11].into_iter().collect();
        let candidates = tree.query_ray_candidates(&ray, false);
        assert!(corner_faces.is_subset(&candidates));

        let (point, face) = tree.closest_intersection(&ray).unwrap();
        assert!(corner_faces.contains(&face), "face {face}");
        assert_relative_eq!(point, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_intersect_all_sorted_front_hits() {
        let tree = sphere_tree();
        for ray in probe_rays() {
            let hits = tree.intersect_all(&ray);
            assert!(hits.len() >= 2, "ray {} passes through the sphere", ray.index);
            assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
            assert!(hits.iter().all(|h| h.hit && h.distance >= 0.0));
            assert_relative_eq!(hits[0].distance, tree.closest_hit(&ray).distance, epsilon = 1e-9);
        }

        // From inside only the far wall is ahead
        let inside = Ray::new(Point3::new(0.01, 0.02, 0.03), Vec3::new(0.3, 0.5, 0.8));
        let hits = tree.intersect_all(&inside);
        assert!(!hits.is_empty());
        let exit = inside.at(hits[0].distance);
        assert!(exit.coords.norm() > 0.85 && exit.coords.norm() <= 1.0 + 1e-9);
    }
}
