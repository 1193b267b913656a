//! Surface models and their harden snapshots.

use std::cell::OnceCell;

use mesh_region::{
    MeshRegion, PointLocator, RegionError, RegionResult, VertexAdjacency, attach_roi_array,
};
use mesh_transform::{Transform3D, harden_mesh};
use mesh_types::{IndexedMesh, ScalarArray};
use nalgebra::Point3;
use tracing::debug;

use crate::{AttributeStore, Attributes, LandmarkError, LandmarkResult};

/// A triangulated surface owned by the host scene.
///
/// Every edit of the geometry or the transform bumps
/// [`generation`](Self::generation), which is how a [`HardenedMesh`] knows it
/// is out of date. Attaching scalar arrays does not.
#[derive(Debug, Clone)]
pub struct SurfaceModel {
    id: String,
    name: String,
    mesh: IndexedMesh,
    transform: Option<Transform3D>,
    attributes: Attributes,
    generation: u64,
}

impl SurfaceModel {
    /// Wrap a mesh.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, mesh: IndexedMesh) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mesh,
            transform: None,
            attributes: Attributes::new(),
            generation: 0,
        }
    }

    /// Model id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mesh in model coordinates.
    #[must_use]
    pub fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    /// Edit the mesh.
    pub fn mesh_mut(&mut self) -> &mut IndexedMesh {
        self.generation += 1;
        &mut self.mesh
    }

    /// Replace the mesh.
    pub fn replace_mesh(&mut self, mesh: IndexedMesh) {
        self.generation += 1;
        self.mesh = mesh;
    }

    /// Parent transform.
    #[must_use]
    pub fn transform(&self) -> Option<&Transform3D> {
        self.transform.as_ref()
    }

    /// Place the model under a transform, or clear it.
    pub fn set_transform(&mut self, transform: Option<Transform3D>) {
        self.generation += 1;
        self.transform = transform;
    }

    /// Edit counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Look up a per-vertex array.
    #[must_use]
    pub fn scalar_array(&self, name: &str) -> Option<&ScalarArray> {
        self.mesh.point_data.get(name)
    }

    /// Attach an array as the active scalars, replacing one with the same name.
    pub fn attach_array(&mut self, array: ScalarArray) {
        let name = array.name().to_owned();
        self.mesh.point_data.insert(array);
        self.mesh.point_data.set_active(&name);
    }

    /// Write a region as an ROI array.
    pub fn attach_roi(&mut self, region: &MeshRegion) -> ScalarArray {
        attach_roi_array(&mut self.mesh, region)
    }

    /// Attribute map.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl AttributeStore for SurfaceModel {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.attribute(key)
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.attributes.set_attribute(key, value);
    }

    fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove_attribute(key)
    }
}

/// A world-space deep copy of a model's mesh.
///
/// Projection and neighborhood queries run against this copy so that a
/// transform on the model does not shift vertex indices. The locator and
/// adjacency are built on first use.
#[derive(Debug)]
pub struct HardenedMesh {
    source_id: String,
    source_generation: u64,
    name: String,
    mesh: IndexedMesh,
    locator: OnceCell<RegionResult<PointLocator>>,
    adjacency: OnceCell<VertexAdjacency>,
}

impl HardenedMesh {
    /// Harden `model` into a snapshot called `name`.
    #[must_use]
    pub fn from_model(model: &SurfaceModel, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut mesh = harden_mesh(&model.mesh, model.transform.as_ref());
        mesh.point_data.clear();

        debug!(
            model = %model.id,
            snapshot = %name,
            generation = model.generation,
            vertices = mesh.vertices.len(),
            "Built harden snapshot"
        );

        Self {
            source_id: model.id.clone(),
            source_generation: model.generation,
            name,
            mesh,
            locator: OnceCell::new(),
            adjacency: OnceCell::new(),
        }
    }

    /// Snapshot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the model this was built from.
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Model generation this was built from.
    #[must_use]
    pub fn source_generation(&self) -> u64 {
        self.source_generation
    }

    /// The hardened mesh.
    #[must_use]
    pub fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    /// Whether this snapshot no longer matches `model`.
    #[must_use]
    pub fn is_stale_for(&self, model: &SurfaceModel) -> bool {
        self.source_id != model.id || self.source_generation != model.generation
    }

    /// Fail with [`LandmarkError::StaleSnapshot`] if stale for `model`.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn ensure_current(&self, model: &SurfaceModel) -> LandmarkResult<()> {
        if self.is_stale_for(model) {
            return Err(LandmarkError::StaleSnapshot {
                snapshot: self.name.clone(),
                model: model.id.clone(),
            });
        }
        Ok(())
    }

    /// Nearest-vertex index over the snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot has no vertices.
    pub fn locator(&self) -> LandmarkResult<&PointLocator> {
        self.locator
            .get_or_init(|| PointLocator::build(&self.mesh))
            .as_ref()
            .map_err(|e| LandmarkError::Region(e.clone()))
    }

    /// Vertex adjacency over the snapshot.
    pub fn adjacency(&self) -> &VertexAdjacency {
        self.adjacency
            .get_or_init(|| VertexAdjacency::from_mesh(&self.mesh))
    }

    /// Closest snapshot vertex to `point` and its position.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot has no vertices.
    pub fn closest_vertex(&self, point: &Point3<f64>) -> LandmarkResult<(u32, Point3<f64>)> {
        let index = self.locator()?.closest_vertex(point);
        let position = self
            .vertex_position(index)
            .ok_or_else(|| RegionError::InvalidVertexIndex {
                index,
                vertex_count: self.vertex_count(),
            })?;
        Ok((index, position))
    }

    /// Position of a snapshot vertex.
    #[must_use]
    pub fn vertex_position(&self, index: u32) -> Option<Point3<f64>> {
        self.mesh.vertices.get(index as usize).map(|v| v.position)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_region::fixtures::uv_sphere;

    #[test]
    fn generation_tracks_edits_but_not_arrays() {
        let mut model = SurfaceModel::new("m1", "skull", uv_sphere(1.0, 8, 8));
        assert_eq!(model.generation(), 0);

        model.attach_roi(&MeshRegion::from_vertices("skull_ROI", [0]));
        assert_eq!(model.generation(), 0);
        assert!(model.scalar_array("skull_ROI").is_some());

        model.set_transform(Some(Transform3D::translation(1.0, 0.0, 0.0)));
        model.mesh_mut().vertices[0].position.x += 0.1;
        model.replace_mesh(uv_sphere(2.0, 8, 8));
        assert_eq!(model.generation(), 3);
    }

    #[test]
    fn snapshot_is_hardened_and_goes_stale() {
        let mut model = SurfaceModel::new("m1", "skull", uv_sphere(100.0, 8, 8));
        model.set_transform(Some(Transform3D::translation(0.0, 0.0, 10.0)));

        let snap = HardenedMesh::from_model(&model, "snap");
        assert!(!snap.is_stale_for(&model));
        assert_relative_eq!(snap.vertex_position(0).unwrap().z, 110.0);
        assert_relative_eq!(model.mesh().vertices[0].position.z, 100.0);

        let (index, position) = snap.closest_vertex(&Point3::new(0.0, 0.0, 111.0)).unwrap();
        assert_eq!(index, 0);
        assert_relative_eq!(position.z, 110.0);

        model.set_transform(None);
        assert!(snap.is_stale_for(&model));
        assert!(matches!(
            snap.ensure_current(&model),
            Err(LandmarkError::StaleSnapshot { .. })
        ));
    }

    #[test]
    fn empty_snapshot_cannot_locate() {
        let model = SurfaceModel::new("m", "empty", IndexedMesh::new());
        let snap = HardenedMesh::from_model(&model, "snap");
        assert!(matches!(
            snap.closest_vertex(&Point3::origin()),
            Err(LandmarkError::Region(RegionError::EmptyMesh))
        ));
        assert!(snap.adjacency().is_empty());
    }

    #[test]
    fn snapshot_drops_point_data() {
        let mut model = SurfaceModel::new("m", "s", uv_sphere(1.0, 8, 8));
        model.attach_roi(&MeshRegion::from_vertices("s_ROI", [1]));
        let snap = HardenedMesh::from_model(&model, "snap");
        assert!(snap.mesh().point_data.is_empty());
        assert_eq!(snap.adjacency().vertex_count(), 50);
    }
}
