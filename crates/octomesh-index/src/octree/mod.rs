//! Octree over a triangle soup.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Children of a node
//! are allocated together, always eight of them, and each stores its parent
//! id so any node can walk back up to the root.
//!
//! A node's triangle list is its parent's list filtered by a
//! separating-axis triangle/box test, so a triangle that straddles a
//! splitting plane appears in every child it touches. The tree partitions
//! space, not triangles.

mod query;

pub use query::FaceSet;

use octomesh_geom::{AxisAlignedBox, FaceIndex, Triangle, TriangleTest};
use octomesh_math::Point3;
use serde::{Deserialize, Serialize};

use crate::config::OctreeConfig;
use crate::error::{OctreeError, Result};
use crate::mesh::TriangleSource;

/// Factor applied to the mesh bounds before making the root box cubic.
pub const ROOT_SCALE: f64 = 1.25;

/// Handle to a node in an [`Octree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the octree.
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeNode {
    bounding_box: AxisAlignedBox,
    triangle_refs: Vec<FaceIndex>,
    children: Option<[NodeId; 8]>,
    parent: Option<NodeId>,
    depth: u32,
}

impl OctreeNode {
    fn new(
        bounding_box: AxisAlignedBox,
        triangle_refs: Vec<FaceIndex>,
        parent: Option<NodeId>,
        depth: u32,
    ) -> Self {
        Self {
            bounding_box,
            triangle_refs,
            children: None,
            parent,
            depth,
        }
    }

    /// The node's cube.
    #[inline]
    pub fn bounding_box(&self) -> &AxisAlignedBox {
        &self.bounding_box
    }

    /// Faces whose geometry overlaps the node's cube.
    #[inline]
    pub fn triangle_refs(&self) -> &[FaceIndex] {
        &self.triangle_refs
    }

    /// The eight children in octant order, or `None` for a leaf.
    #[inline]
    pub fn children(&self) -> Option<&[NodeId; 8]> {
        self.children.as_ref()
    }

    /// Parent node, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Depth below the root (root = 0).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctreeStats {
    /// Total number of nodes, root included.
    pub node_count: usize,
    /// Nodes without children.
    pub leaf_count: usize,
    /// Deepest leaf depth.
    pub max_depth_reached: u32,
    /// Largest triangle list held by a leaf.
    pub max_leaf_refs: usize,
    /// Sum of leaf triangle list lengths (counts duplicates).
    pub total_leaf_refs: usize,
    /// Triangles that only the robust test can hit.
    pub degenerate_triangles: usize,
}

impl OctreeStats {
    fn collect(nodes: &[OctreeNode], tests: &[TriangleTest]) -> Self {
        let mut stats = Self {
            node_count: nodes.len(),
            degenerate_triangles: tests.iter().filter(|t| !t.is_fast()).count(),
            ..Self::default()
        };
        for node in nodes.iter().filter(|n| n.is_leaf()) {
            stats.leaf_count += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(node.depth);
            stats.max_leaf_refs = stats.max_leaf_refs.max(node.triangle_refs.len());
            stats.total_leaf_refs += node.triangle_refs.len();
        }
        stats
    }
}

/// Octree spatial index over a triangle mesh.
///
/// Immutable once built; rebuild wholesale with [`Octree::rebuild`] when
/// the mesh changes.
#[derive(Debug, Clone)]
pub struct Octree {
    config: OctreeConfig,
    triangles: Vec<Triangle>,
    tests: Vec<TriangleTest>,
    nodes: Vec<OctreeNode>,
    stats: OctreeStats,
}

impl Octree {
    /// Id of the root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Build an octree over `mesh`.
    ///
    /// Fails with [`OctreeError::EmptyMesh`] for a mesh without faces, and
    /// with [`OctreeError::VertexOutOfRange`] if a face references a
    /// missing vertex.
    pub fn build<M: TriangleSource + ?Sized>(mesh: &M, config: OctreeConfig) -> Result<Self> {
        config.validate()?;

        let triangles = collect_triangles(mesh)?;
        let tests: Vec<TriangleTest> = triangles
            .iter()
            .map(|[a, b, c]| TriangleTest::new(a, b, c))
            .collect();

        let root_box = AxisAlignedBox::from_triangles(&triangles)
            .ok_or(OctreeError::EmptyMesh)?
            .scaled_cubic(ROOT_SCALE);

        let mut builder = Builder {
            config: &config,
            triangles: &triangles,
            nodes: vec![OctreeNode::new(root_box, (0..triangles.len()).collect(), None, 0)],
        };
        builder.subdivide(Self::ROOT);
        let nodes = builder.nodes;

        let stats = OctreeStats::collect(&nodes, &tests);
        tracing::debug!(
            faces = triangles.len(),
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            depth = stats.max_depth_reached,
            degenerate = stats.degenerate_triangles,
            "built octree"
        );

        Ok(Self {
            config,
            triangles,
            tests,
            nodes,
            stats,
        })
    }

    /// Build with the given leaf capacity and the default depth limit.
    pub fn with_max_triangles<M: TriangleSource + ?Sized>(
        mesh: &M,
        max_triangles_per_node: usize,
    ) -> Result<Self> {
        Self::build(mesh, OctreeConfig::new(max_triangles_per_node))
    }

    /// Replace the whole tree with one built from `mesh`, keeping the config.
    ///
    /// On error the existing tree is left untouched.
    pub fn rebuild<M: TriangleSource + ?Sized>(&mut self, mesh: &M) -> Result<()> {
        *self = Self::build(mesh, self.config)?;
        Ok(())
    }

    /// The config this tree was built with.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Build statistics.
    pub fn stats(&self) -> &OctreeStats {
        &self.stats
    }

    /// Number of indexed faces.
    pub fn face_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex positions of a face.
    pub fn triangle(&self, face: FaceIndex) -> Option<&Triangle> {
        self.triangles.get(face)
    }

    /// Intersection tier of a face.
    pub fn triangle_test(&self, face: FaceIndex) -> Option<&TriangleTest> {
        self.tests.get(face)
    }

    /// The root node.
    pub fn root(&self) -> &OctreeNode {
        &self.nodes[Self::ROOT.0]
    }

    /// A node by id, `None` if the id doesn't belong to this tree.
    pub fn node(&self, id: NodeId) -> Option<&OctreeNode> {
        self.nodes.get(id.0)
    }

    /// All nodes with their ids, parents before children.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &OctreeNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// All leaves with their ids.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &OctreeNode)> + '_ {
        self.nodes().filter(|(_, n)| n.is_leaf())
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node, `None` for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId; 8]> {
        self.node(id)?.children.as_ref()
    }

    /// Depth of a node below the root.
    pub fn depth_of(&self, id: NodeId) -> Option<u32> {
        self.node(id).map(OctreeNode::depth)
    }

    /// Walk parent links from `id` up to the root.
    ///
    /// Returns `None` if `id` doesn't belong to this tree.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        let mut node = self.node(current)?;
        while let Some(parent) = node.parent {
            current = parent;
            node = &self.nodes[parent.0];
        }
        Some(current)
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// The leaf whose cube strictly contains `p`.
    ///
    /// `None` outside the root, or when `p` lies on a splitting plane.
    pub fn leaf_containing(&self, p: &Point3) -> Option<NodeId> {
        let mut id = Self::ROOT;
        if !self.root().bounding_box.contains_point(p) {
            return None;
        }
        while let Some(children) = &self.nodes[id.0].children {
            id = *children
                .iter()
                .find(|c| self.nodes[c.0].bounding_box.contains_point(p))?;
        }
        Some(id)
    }
}

/// Copy the mesh into a triangle soup, checking vertex ids.
fn collect_triangles<M: TriangleSource + ?Sized>(mesh: &M) -> Result<Vec<Triangle>> {
    let face_count = mesh.face_count();
    if face_count == 0 {
        return Err(OctreeError::EmptyMesh);
    }

    let vertex_count = mesh.vertex_count();
    (0..face_count)
        .map(|face| {
            let ids = mesh.triangle_vertices(face);
            if let Some(&vertex) = ids.iter().find(|&&v| v >= vertex_count) {
                return Err(OctreeError::VertexOutOfRange {
                    face,
                    vertex,
                    vertex_count,
                });
            }
            Ok(ids.map(|v| mesh.vertex_position(v)))
        })
        .collect()
}

/// Recursive subdivision state.
struct Builder<'a> {
    config: &'a OctreeConfig,
    triangles: &'a [Triangle],
    nodes: Vec<OctreeNode>,
}

impl Builder<'_> {
    /// Split `id` into eight children if it holds too many triangles, then
    /// recurse into every child, empty ones included.
    fn subdivide(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        if node.triangle_refs.len() <= self.config.max_triangles_per_node
            || node.depth >= self.config.max_depth
        {
            return;
        }
        // A zero-size cube splits into eight copies of itself
        if node.bounding_box.half_extent().max() <= 0.0 {
            return;
        }

        let parent_box = node.bounding_box;
        let depth = node.depth + 1;
        let first = self.nodes.len();

        for octant in 0..8 {
            let child_box = parent_box.child(octant);
            let refs: Vec<FaceIndex> = self.nodes[id.0]
                .triangle_refs
                .iter()
                .copied()
                .filter(|&face| {
                    let [a, b, c] = &self.triangles[face];
                    child_box.overlaps_triangle(a, b, c)
                })
                .collect();
            self.nodes.push(OctreeNode::new(child_box, refs, Some(id), depth));
        }

        let children: [NodeId; 8] = std::array::from_fn(|i| NodeId(first + i));
        self.nodes[id.0].children = Some(children);

        for child in children {
            self.subdivide(child);
        }
    }
}
