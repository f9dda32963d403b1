//! Error types for building and querying the index.

use octomesh_geom::FaceIndex;
use thiserror::Error;

use crate::mesh::VertexId;

/// Errors that can occur while building the octree or a scan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OctreeError {
    /// Mesh has no triangles, so there is no root box to build.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A face references a vertex the mesh doesn't have.
    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        /// Offending face.
        face: FaceIndex,
        /// Vertex id it references.
        vertex: VertexId,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Invalid octree configuration.
    #[error("invalid octree config: {0}")]
    InvalidConfig(String),

    /// Invalid depth scan settings or camera.
    #[error("invalid scan settings: {0}")]
    InvalidScan(String),
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, OctreeError>;
