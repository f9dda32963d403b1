//! Triangle mesh input.
//!
//! The index never owns the caller's mesh type. It reads positions and
//! connectivity through [`TriangleSource`] once at build time and keeps its
//! own flat copy of the triangle soup.

use std::f64::consts::PI;

use octomesh_geom::{FaceIndex, Triangle};
use octomesh_math::Point3;

/// Index of a vertex in the source mesh.
pub type VertexId = usize;

/// Read access to a triangle mesh.
pub trait TriangleSource {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// Position of a vertex. Only called with ids below [`TriangleSource::vertex_count`].
    fn vertex_position(&self, vertex: VertexId) -> Point3;

    /// The three vertices of a face. Only called with ids below [`TriangleSource::face_count`].
    fn triangle_vertices(&self, face: FaceIndex) -> [VertexId; 3];
}

/// Owned indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex ids per triangle.
    pub faces: Vec<[VertexId; 3]>,
}

impl IndexedMesh {
    /// Create a mesh from vertex positions and faces.
    pub fn new(vertices: Vec<Point3>, faces: Vec<[VertexId; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create from flat buffers: interleaved `x, y, z` positions and
    /// triangle indices in groups of three.
    ///
    /// A trailing partial vertex or triangle is ignored.
    pub fn from_flat(vertices: &[f32], indices: &[u32]) -> Self {
        let vertices = vertices
            .chunks_exact(3)
            .map(|c| Point3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
            .collect();
        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0] as VertexId, c[1] as VertexId, c[2] as VertexId])
            .collect();
        Self { vertices, faces }
    }

    /// Axis-aligned cube centered at the origin: 8 vertices, 12 outward-wound triangles.
    ///
    /// Vertex `i` sits at `±half` per axis by octant bits (bit 0 = +x,
    /// bit 1 = +y, bit 2 = +z).
    pub fn cube(half: f64) -> Self {
        let vertices = (0..8)
            .map(|i| {
                let s = |bit: usize| if i & bit != 0 { half } else { -half };
                Point3::new(s(1), s(2), s(4))
            })
            .collect();

        let quads: [[VertexId; 4]; 6] = [
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
        ];
        let faces = quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();

        Self { vertices, faces }
    }

    /// Latitude/longitude sphere centered at the origin.
    ///
    /// `segments` is clamped to at least 3 and `rings` to at least 2.
    pub fn uv_sphere(radius: f64, segments: usize, rings: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(2 + segments * (rings - 1));
        vertices.push(Point3::new(0.0, 0.0, radius));
        for ring in 1..rings {
            let theta = PI * ring as f64 / rings as f64;
            let (st, ct) = theta.sin_cos();
            for seg in 0..segments {
                let phi = 2.0 * PI * seg as f64 / segments as f64;
                let (sp, cp) = phi.sin_cos();
                vertices.push(Point3::new(radius * st * cp, radius * st * sp, radius * ct));
            }
        }
        vertices.push(Point3::new(0.0, 0.0, -radius));
        let south = vertices.len() - 1;

        let ring_start = |ring: usize| 1 + (ring - 1) * segments;
        let mut faces = Vec::with_capacity(2 * segments * (rings - 1));

        for seg in 0..segments {
            let next = (seg + 1) % segments;
            faces.push([0, ring_start(1) + seg, ring_start(1) + next]);
        }
        for ring in 1..rings - 1 {
            let (top, bottom) = (ring_start(ring), ring_start(ring + 1));
            for seg in 0..segments {
                let next = (seg + 1) % segments;
                faces.push([top + seg, bottom + seg, bottom + next]);
                faces.push([top + seg, bottom + next, top + next]);
            }
        }
        let last = ring_start(rings - 1);
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            faces.push([last + seg, south, last + next]);
        }

        Self { vertices, faces }
    }
}

impl TriangleSource for IndexedMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex_position(&self, vertex: VertexId) -> Point3 {
        self.vertices[vertex]
    }

    fn triangle_vertices(&self, face: FaceIndex) -> [VertexId; 3] {
        self.faces[face]
    }
}

/// A bare triangle soup: face `f` owns vertices `3f`, `3f + 1`, `3f + 2`.
impl TriangleSource for [Triangle] {
    fn vertex_count(&self) -> usize {
        self.len() * 3
    }

    fn face_count(&self) -> usize {
        self.len()
    }

    fn vertex_position(&self, vertex: VertexId) -> Point3 {
        self[vertex / 3][vertex % 3]
    }

    fn triangle_vertices(&self, face: FaceIndex) -> [VertexId; 3] {
        [3 * face, 3 * face + 1, 3 * face + 2]
    }
}

impl TriangleSource for Vec<Triangle> {
    fn vertex_count(&self) -> usize {
        self.as_slice().vertex_count()
    }

    fn face_count(&self) -> usize {
        self.as_slice().face_count()
    }

    fn vertex_position(&self, vertex: VertexId) -> Point3 {
        self.as_slice().vertex_position(vertex)
    }

    fn triangle_vertices(&self, face: FaceIndex) -> [VertexId; 3] {
        self.as_slice().triangle_vertices(face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signed_volume(mesh: &IndexedMesh) -> f64 {
        mesh.faces
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = (mesh.vertices[a], mesh.vertices[b], mesh.vertices[c]);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    #[test]
    fn test_cube_counts_and_winding() {
        let cube = IndexedMesh::cube(1.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        // Outward winding gives a positive enclosed volume of 2^3
        assert_relative_eq!(signed_volume(&cube), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uv_sphere_counts_and_winding() {
        let sphere = IndexedMesh::uv_sphere(1.0, 16, 8);
        assert_eq!(sphere.vertex_count(), 2 + 16 * 7);
        assert_eq!(sphere.face_count(), 2 * 16 * 7);
        let volume = signed_volume(&sphere);
        assert!(volume > 3.0 && volume < 4.0 * PI / 3.0, "volume {volume}");
        for p in &sphere.vertices {
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_from_flat() {
        let vertices = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 9.0];
        let indices = [0, 1, 2, 2];
        let mesh = IndexedMesh::from_flat(&vertices, &indices);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.triangle_vertices(0), [0, 1, 2]);
        assert_relative_eq!(mesh.vertex_position(1), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_soup_source() {
        let soup: Vec<Triangle> = vec![
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(6.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
            ],
        ];
        assert_eq!(soup.face_count(), 2);
        assert_eq!(soup.vertex_count(), 6);
        assert_eq!(soup.triangle_vertices(1), [3, 4, 5]);
        assert_relative_eq!(soup.vertex_position(4), Point3::new(6.0, 0.0, 0.0));
    }
}
