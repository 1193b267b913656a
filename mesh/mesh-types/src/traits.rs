//! Read-only view of a triangle surface.

use nalgebra::Point3;

/// Counts and point lookup shared by every surface representation.
///
/// Region and landmark code only needs to know how many points a surface
/// has and where a given point sits.
pub trait MeshTopology {
    /// Number of points.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// A surface with no triangles cannot host a region, even if it has
    /// loose points.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Position of point `index`, or `None` past the end.
    fn position(&self, index: usize) -> Option<Point3<f64>>;
}
