#![warn(missing_docs)]

//! Octree spatial index and ray picking for triangle meshes.
//!
//! Re-exports the math, geometry and index crates behind one import.
//!
//! # Example
//!
//! ```
//! use octomesh::{IndexedMesh, Octree, Point3, Ray, Vec3};
//!
//! let sphere = IndexedMesh::uv_sphere(1.0, 32, 16);
//! let tree = Octree::with_max_triangles(&sphere, 8).unwrap();
//!
//! let ray = Ray::new(Point3::new(0.0, 0.1, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let (point, _face) = tree.closest_intersection(&ray).unwrap();
//! assert!(point.z > 0.9 && point.z <= 1.0);
//!
//! let near = tree.query_sphere(&point, 0.1);
//! assert!(!near.is_empty());
//! ```

pub use octomesh_geom;
pub use octomesh_index;
pub use octomesh_math;

pub use octomesh_geom::{
    intersect::ray_triangle, AxisAlignedBox, Degenerate, FaceIndex, HitResult, Ray, TriAccel,
    Triangle, TriangleTest,
};
pub use octomesh_index::{
    DepthImage, DepthScanner, FaceSet, IndexedMesh, NodeId, Octree, OctreeConfig, OctreeError,
    OctreeNode, OctreeStats, Result, ScanCamera, ScanConfig, TriangleSource, VertexId,
};
pub use octomesh_math::{Dir3, Point3, Tolerance, Vec3};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_buffer_round_trip() {
        // Unit square in the z = 0 plane, two triangles
        let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2, 0, 2, 3];
        let mesh = IndexedMesh::from_flat(&vertices, &indices);
        let tree = Octree::build(&mesh, OctreeConfig::default()).unwrap();

        let ray = Ray::new(Point3::new(0.75, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let (point, face) = tree.closest_intersection(&ray).unwrap();
        assert_eq!(face, 0);
        assert_relative_eq!(point, Point3::new(0.75, 0.25, 0.0), epsilon = 1e-9);

        let ray = Ray::new(Point3::new(0.25, 0.75, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tree.closest_intersection(&ray).map(|(_, f)| f), Some(1));
    }

    #[test]
    fn test_scan_sphere_depths() {
        let tree = Octree::with_max_triangles(&IndexedMesh::uv_sphere(1.0, 32, 16), 8).unwrap();
        let camera = ScanCamera::look_at(Point3::new(0.0, -4.0, 0.0), Point3::origin(), Vec3::z());
        let config = ScanConfig {
            width: 17,
            height: 17,
            fov_y_degrees: 45.0,
        };
        let image = DepthScanner::new(&tree, camera, config).unwrap().scan();

        let center = image.depth_at(8, 8).unwrap();
        assert!(center > 2.9 && center < 3.1, "center depth {center}");
        for p in image.point_cloud() {
            assert!(p.coords.norm() <= 1.0 + 1e-9);
            assert!(p.y < 0.0);
        }
    }
}
