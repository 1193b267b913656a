//! Nearest-vertex lookup.

use std::fmt;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

use crate::{RegionError, RegionResult};

/// Result of a nearest-vertex query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestVertex {
    /// Index of the closest mesh vertex.
    pub index: u32,
    /// Squared Euclidean distance from the query point to that vertex.
    pub distance_squared: f64,
}

/// KD-tree over a mesh's vertex positions.
///
/// Build it once per mesh version; queries are `O(log n)` expected. Flat
/// patches and stacks of coincident vertices are fine.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Point3};
/// use mesh_region::PointLocator;
///
/// let mesh = IndexedMesh::from_raw(
///     &[0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0],
///     &[0, 1, 2],
/// );
/// let locator = PointLocator::build(&mesh).unwrap();
///
/// assert_eq!(locator.closest_vertex(&Point3::new(9.0, 1.0, 0.0)), 1);
/// ```
pub struct PointLocator {
    tree: ImmutableKdTree<f64, 3>,
    vertex_count: usize,
}

impl PointLocator {
    /// Index every vertex of `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyMesh`] if the mesh has no vertices,
    /// [`RegionError::TooManyVertices`] if its indices do not fit in `u32`
    /// and [`RegionError::NonFinitePosition`] for a NaN or infinite
    /// coordinate.
    pub fn build(mesh: &IndexedMesh) -> RegionResult<Self> {
        let vertex_count = mesh.vertices.len();
        if vertex_count == 0 {
            return Err(RegionError::EmptyMesh);
        }
        if u32::try_from(vertex_count).is_err() {
            return Err(RegionError::TooManyVertices { vertex_count });
        }

        let mut positions = Vec::with_capacity(vertex_count);
        for (i, v) in mesh.vertices.iter().enumerate() {
            let p = &v.position;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                let index = u32::try_from(i).unwrap_or(u32::MAX);
                return Err(RegionError::NonFinitePosition { index });
            }
            positions.push([p.x, p.y, p.z]);
        }
        let tree = ImmutableKdTree::new_from_slice(&positions);

        debug!(vertices = vertex_count, "Built point locator");

        Ok(Self { tree, vertex_count })
    }

    /// Number of indexed vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Index of the vertex closest to `point`.
    #[must_use]
    pub fn closest_vertex(&self, point: &Point3<f64>) -> u32 {
        self.closest(point).index
    }

    /// Closest vertex together with its squared distance.
    #[must_use]
    pub fn closest(&self, point: &Point3<f64>) -> ClosestVertex {
        let nearest = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[point.x, point.y, point.z]);
        // Items were inserted from u32-checked indices.
        #[allow(clippy::cast_possible_truncation)]
        let index = nearest.item as u32;
        ClosestVertex {
            index,
            distance_squared: nearest.distance,
        }
    }
}

impl fmt::Debug for PointLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointLocator")
            .field("vertex_count", &self.vertex_count)
            .finish_non_exhaustive()
    }
}
