//! ROI scalar arrays.
//!
//! An ROI is shown on a surface as a per-vertex scalar array holding `1.0`
//! inside the region and `0.0` elsewhere. Building it again with the same
//! region yields an identical array that replaces the old one in place.

use mesh_types::{IndexedMesh, ScalarArray};
use tracing::debug;

use crate::MeshRegion;

/// Build the ROI mask for a mesh with `vertex_count` vertices.
///
/// The array takes the region's name.
#[must_use]
pub fn build_roi_array(vertex_count: usize, region: &MeshRegion) -> ScalarArray {
    ScalarArray::new(region.name(), region.to_mask(vertex_count))
}

/// Build the ROI mask for `mesh` and attach it as the active scalars.
///
/// Any array with the same name is replaced. Geometry is untouched.
/// Returns a copy of the attached array.
///
/// # Example
///
/// ```
/// use mesh_region::{MeshRegion, attach_roi_array, fixtures::uv_sphere};
///
/// let mut sphere = uv_sphere(1.0, 8, 8);
/// let region = MeshRegion::from_vertices("sphere_ROI", [0, 2, 8]);
///
/// let array = attach_roi_array(&mut sphere, &region);
/// assert_eq!(array.len(), 50);
/// assert_eq!(sphere.point_data.active().map(|a| a.name()), Some("sphere_ROI"));
/// ```
pub fn attach_roi_array(mesh: &mut IndexedMesh, region: &MeshRegion) -> ScalarArray {
    let array = build_roi_array(mesh.vertices.len(), region);

    debug!(
        array = region.name(),
        inside = region.vertex_count(),
        vertices = mesh.vertices.len(),
        "Attaching ROI array"
    );

    mesh.point_data.insert(array.clone());
    mesh.point_data.set_active(region.name());
    array
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixtures::uv_sphere;
    use crate::{VertexAdjacency, expand_neighborhood};

    #[test]
    fn mask_marks_region_only() {
        let region = MeshRegion::from_vertices("roi", [0, 2]);
        let array = build_roi_array(4, &region);
        assert_eq!(array.name(), "roi");
        assert_eq!(array.values(), &[1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn attach_twice_is_identical_and_replaces() {
        let mut mesh = uv_sphere(100.0, 8, 8);
        let adj = VertexAdjacency::from_mesh(&mesh);
        let set = expand_neighborhood(&adj, 35, 2).unwrap();
        let region = MeshRegion::from_vertices("sphere_ROI", set);

        let first = attach_roi_array(&mut mesh, &region);
        let second = attach_roi_array(&mut mesh, &region);

        assert_eq!(first, second);
        let bits = |a: &ScalarArray| a.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
        assert_eq!(mesh.point_data.len(), 1);
        assert_eq!(first.nonzero_indices().count(), 19);
    }

    #[test]
    fn attach_leaves_geometry_alone() {
        let mut mesh = uv_sphere(100.0, 8, 8);
        let before = mesh.vertices.clone();
        attach_roi_array(&mut mesh, &MeshRegion::from_vertices("r", [1]));
        assert_eq!(mesh.vertices, before);
    }

    #[test]
    fn empty_region_is_all_zero() {
        let mut mesh = uv_sphere(1.0, 8, 8);
        let array = attach_roi_array(&mut mesh, &MeshRegion::new("r"));
        assert_eq!(array.nonzero_indices().count(), 0);
        assert_eq!(array.len(), 50);
    }
}
