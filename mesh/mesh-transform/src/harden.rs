//! Transform hardening.

use mesh_types::IndexedMesh;
use nalgebra::Point3;
use tracing::debug;

use crate::Transform3D;

/// Produce a world-space deep copy of a mesh.
///
/// The copy has the same vertex count, face list and point data as the
/// input; only positions change. With `None` (or an identity transform)
/// the result is a plain clone.
///
/// The input is never modified, so vertex indices into the copy are valid
/// indices into the original.
#[must_use]
pub fn harden_mesh(mesh: &IndexedMesh, transform: Option<&Transform3D>) -> IndexedMesh {
    let mut hardened = mesh.clone();

    let Some(transform) = transform.filter(|t| !t.is_identity()) else {
        return hardened;
    };

    debug!(
        vertices = hardened.vertices.len(),
        "Hardening transform into mesh copy"
    );

    for vertex in &mut hardened.vertices {
        vertex.position = transform.transform_point(&vertex.position);
    }

    hardened
}

/// Apply an optional transform to a list of points.
#[must_use]
pub fn harden_points(points: &[Point3<f64>], transform: Option<&Transform3D>) -> Vec<Point3<f64>> {
    match transform {
        Some(t) => points.iter().map(|p| t.transform_point(p)).collect(),
        None => points.to_vec(),
    }
}
