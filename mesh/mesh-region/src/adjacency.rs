//! Vertex adjacency graph.
//!
//! Two vertices are adjacent when they share a triangle. This is the graph
//! the neighborhood expander walks.

use mesh_types::IndexedMesh;

/// One-ring adjacency for every vertex of a mesh.
///
/// Built once per mesh version and reused for every neighborhood query.
///
/// # Example
///
/// ```
/// use mesh_types::IndexedMesh;
/// use mesh_region::VertexAdjacency;
///
/// let mesh = IndexedMesh::from_raw(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
///     &[0, 1, 2, 1, 3, 2],
/// );
/// let adjacency = VertexAdjacency::from_mesh(&mesh);
///
/// assert_eq!(adjacency.neighbors(0), &[1, 2]);
/// assert_eq!(adjacency.neighbors(1).len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexAdjacency {
    neighbors: Vec<Vec<u32>>,
}

impl VertexAdjacency {
    /// Build adjacency from a mesh's faces.
    ///
    /// Faces referencing a vertex outside the mesh are skipped.
    #[must_use]
    pub fn from_mesh(mesh: &IndexedMesh) -> Self {
        let vertex_count = mesh.vertices.len();
        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];

        for &[i0, i1, i2] in &mesh.faces {
            if [i0, i1, i2].iter().any(|&i| i as usize >= vertex_count) {
                continue;
            }
            Self::add_edge(&mut neighbors, i0, i1);
            Self::add_edge(&mut neighbors, i1, i2);
            Self::add_edge(&mut neighbors, i2, i0);
        }

        Self { neighbors }
    }

    /// Add an undirected edge, ignoring self-loops and duplicates.
    fn add_edge(neighbors: &mut [Vec<u32>], a: u32, b: u32) {
        if a == b {
            return;
        }
        if !neighbors[a as usize].contains(&b) {
            neighbors[a as usize].push(b);
        }
        if !neighbors[b as usize].contains(&a) {
            neighbors[b as usize].push(a);
        }
    }

    /// Number of vertices in the graph.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the graph has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Vertices sharing a face with `vertex`, in first-seen order.
    ///
    /// Out-of-range vertices have no neighbors.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, vertex: u32) -> &[u32] {
        self.neighbors
            .get(vertex as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether `vertex` is a valid index into this graph.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: u32) -> bool {
        (vertex as usize) < self.neighbors.len()
    }

    /// Total number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}
