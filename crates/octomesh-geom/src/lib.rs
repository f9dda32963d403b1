#![warn(missing_docs)]

//! Geometric primitives for the octomesh triangle index.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray with origin, unit direction and an optional thickness
//! - [`AxisAlignedBox`] - Center/half-extent box with slab, sphere and
//!   separating-axis triangle tests
//! - [`HitResult`] - Transient record of a ray/triangle hit
//! - [`TriAccel`] - Precomputed projected plane equation for fast ray tests
//! - [`intersect`] - Epsilon-tolerant Möller–Trumbore ray/triangle test
//!
//! # Example
//!
//! ```
//! use octomesh_geom::{intersect::ray_triangle, Ray, TriangleTest};
//! use octomesh_math::{Point3, Vec3};
//!
//! let tri = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let ray = Ray::new(Point3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
//!
//! let fast = TriangleTest::new(&tri[0], &tri[1], &tri[2]);
//! let (t, _, _) = fast.intersect(&ray, 0.0, f64::INFINITY).unwrap();
//! assert!((t - 1.0).abs() < 1e-12);
//!
//! let robust = ray_triangle(&ray, &tri, 0, false).unwrap();
//! assert_eq!(robust.face_index, Some(0));
//! ```

mod aabb;
mod hit;
pub mod intersect;
mod ray;
mod tri_accel;

pub use aabb::AxisAlignedBox;
pub use hit::HitResult;
pub use ray::Ray;
pub use tri_accel::{Degenerate, TriAccel, TriangleTest};

use octomesh_math::Point3;

/// Index of a triangle in the source mesh's face array.
pub type FaceIndex = usize;

/// Three vertex positions of a triangle, in winding order.
pub type Triangle = [Point3; 3];
