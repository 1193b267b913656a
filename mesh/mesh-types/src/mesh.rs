//! Indexed triangle mesh.

use crate::{MeshTopology, PointData, Vertex};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Triangle surface of a model: shared vertices, index triples, and the
/// per-vertex arrays a host attaches to it.
///
/// Named per-vertex arrays ride along in
/// [`point_data`](Self::point_data); their length is expected to equal the
/// vertex count, and anything that changes vertex indices must clear them.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, MeshTopology, Point3};
///
/// let mesh = IndexedMesh::from_raw(
///     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     &[0, 1, 2],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.position(2), Some(Point3::new(0.0, 1.0, 0.0)));
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Point positions, addressed by index from `faces`.
    pub vertices: Vec<Vertex>,

    /// Triangles; each entry names three vertices.
    pub faces: Vec<[u32; 3]>,

    /// Named per-vertex scalar arrays.
    pub point_data: PointData,
}

impl IndexedMesh {
    /// Mesh with no points and no triangles.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            point_data: PointData::new(),
        }
    }

    /// Empty mesh sized for a generator that knows its output counts.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            point_data: PointData::new(),
        }
    }

    /// Wrap existing point and triangle buffers. No arrays are attached.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            point_data: PointData::new(),
        }
    }

    /// Build from the flat buffers a host exports: `positions` holds xyz
    /// triples and `indices` holds triangle triples.
    ///
    /// Ragged input (a length that is not a multiple of 3) yields an empty
    /// mesh rather than a partial one.
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        Self::from_parts(
            positions
                .chunks_exact(3)
                .map(|xyz| Vertex::from_coords(xyz[0], xyz[1], xyz[2]))
                .collect(),
            indices
                .chunks_exact(3)
                .map(|tri| [tri[0], tri[1], tri[2]])
                .collect(),
        )
    }

    /// Whether two meshes share vertex count and face connectivity.
    ///
    /// This is the precondition for copying a per-vertex array from one
    /// mesh to the other. Positions are not compared.
    #[must_use]
    pub fn same_topology(&self, other: &Self) -> bool {
        self.vertices.len() == other.vertices.len() && self.faces == other.faces
    }

    /// Check that every face references an existing vertex.
    #[must_use]
    pub fn faces_in_bounds(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n))
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.vertices.get(index).map(|v| v.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScalarArray;
    use approx::assert_relative_eq;

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2])
    }

    #[test]
    fn points_without_triangles_count_as_empty() {
        let mut mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh.is_empty());

        mesh.faces.push([0, 0, 0]);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn mesh_from_raw_rejects_ragged_input() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0], &[0, 1, 2]);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(triangle().vertex_count(), 3);
    }

    #[test]
    fn clone_is_deep_including_point_data() {
        let mut mesh = triangle();
        mesh.point_data.insert(ScalarArray::filled("roi", 3, 1.0));

        let mut copy = mesh.clone();
        copy.vertices[0].position.x = 1.0;
        copy.point_data.clear();

        assert_relative_eq!(mesh.vertices[0].position.x, 0.0);
        assert!(mesh.point_data.contains("roi"));
    }

    #[test]
    fn same_topology_ignores_positions() {
        let a = triangle();
        let mut b = triangle();
        for v in &mut b.vertices {
            v.position.z += 5.0;
        }
        assert!(a.same_topology(&b));

        b.faces[0] = [0, 2, 1];
        assert!(!a.same_topology(&b));
    }

    #[test]
    fn position_stops_at_vertex_count() {
        let mesh = triangle();
        assert_eq!(mesh.position(1), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(mesh.position(3), None);
    }

    #[test]
    fn faces_in_bounds_detects_bad_index() {
        let mut mesh = triangle();
        assert!(mesh.faces_in_bounds());
        mesh.faces.push([0, 1, 7]);
        assert!(!mesh.faces_in_bounds());
    }
}
