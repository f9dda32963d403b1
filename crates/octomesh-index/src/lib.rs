#![warn(missing_docs)]

//! Octree spatial index over triangle meshes.
//!
//! Build an [`Octree`] once from anything implementing [`TriangleSource`],
//! then run broad-phase point, sphere and ray queries against it, or ask
//! for the closest hit along a ray. Closest-hit queries try an exact
//! projected-plane test first and fall back to a tolerant Möller–Trumbore
//! pass with a thickened ray when the fast test finds nothing.
//!
//! # Example
//!
//! ```
//! use octomesh_geom::Ray;
//! use octomesh_index::{IndexedMesh, Octree};
//! use octomesh_math::{Point3, Vec3};
//!
//! let mesh = IndexedMesh::cube(1.0);
//! let tree = Octree::with_max_triangles(&mesh, 4).unwrap();
//!
//! let ray = Ray::new(Point3::new(0.2, 0.3, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let (point, face) = tree.closest_intersection(&ray).unwrap();
//! assert!((point.z - 1.0).abs() < 1e-9);
//! assert!(face == 10 || face == 11);
//! ```

pub mod config;
pub mod error;
pub mod mesh;
pub mod octree;
pub mod scan;

pub use config::{OctreeConfig, MAX_DEPTH_LIMIT};
pub use error::{OctreeError, Result};
pub use mesh::{IndexedMesh, TriangleSource, VertexId};
pub use octree::{FaceSet, NodeId, Octree, OctreeNode, OctreeStats, ROOT_SCALE};
pub use scan::{DepthImage, DepthScanner, ScanCamera, ScanConfig, MAX_SCAN_PIXELS};
