//! Carrying a collection's ROI from its model to other models.
//!
//! Two strategies, chosen by [`PropagationMode`]:
//!
//! - **Correspondent**: source and target share vertex count and ordering,
//!   so the ROI array is copied as is. Topology equality is not checked;
//!   copying between unrelated meshes yields a meaningless mask.
//! - **Non-correspondent**: every landmark with a radius is located again
//!   on the target's harden snapshot and its neighborhood is expanded on the
//!   target's own topology.

use mesh_region::{MeshRegion, expand_neighborhoods};
use mesh_types::ScalarArray;
use tracing::{debug, info, warn};

use crate::logic::{load_descriptions, roi_array_name};
use crate::{
    AttributeStore, HardenedMesh, LandmarkCollection, LandmarkConfig, LandmarkError,
    LandmarkResult, PropagationMode, SurfaceModel, keys,
};

/// Outcome of propagating to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    /// Target model id.
    pub model_id: String,
    /// Strategy used.
    pub mode: PropagationMode,
    /// Name of the array written on the target.
    pub array_name: String,
    /// Number of target vertices inside the ROI.
    pub roi_vertex_count: usize,
    /// A correspondent copy between a cleaned and an uncleaned mesh, whose
    /// vertex orders may differ.
    pub mixed_clean_state: bool,
}

/// The "propagate" action.
///
/// # Example
///
/// ```
/// use mesh_landmarks::{
///     AutoConfirm, LandmarkCollection, LandmarkConfig, LandmarkLogic, PropagationMode,
///     Propagator, SurfaceModel,
/// };
/// use mesh_region::fixtures::uv_sphere;
///
/// let mut logic = LandmarkLogic::new(LandmarkConfig::unattended());
/// let mut source = SurfaceModel::new("t0", "t0", uv_sphere(100.0, 8, 8));
/// let mut later = SurfaceModel::new("t1", "t1", uv_sphere(110.0, 8, 8));
/// let mut points = LandmarkCollection::new("F", "F");
///
/// let snapshot = logic.model_changed(&mut source);
/// logic.connect(&mut points, &mut source, &snapshot, &mut AutoConfirm(true)).unwrap();
/// let id = points.add(snapshot.vertex_position(9).unwrap());
/// logic.landmark_added(&mut points, &id, &snapshot, &mut source).unwrap();
/// logic.set_roi_radius(&mut points, &id, 1.0, &snapshot, &mut source).unwrap();
///
/// let reports = Propagator::new(LandmarkConfig::default())
///     .propagate(&mut source, &mut points, [&mut later], PropagationMode::Correspondent)
///     .unwrap();
/// assert_eq!(reports[0].roi_vertex_count, 7);
/// assert_eq!(
///     later.scalar_array("t0_ROI").map(|a| a.values()),
///     source.scalar_array("t0_ROI").map(|a| a.values()),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    config: LandmarkConfig,
}

impl Propagator {
    /// Create a propagator.
    #[must_use]
    pub fn new(config: LandmarkConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &LandmarkConfig {
        &self.config
    }

    /// Propagate the ROI of `collection` from `source` to every target.
    ///
    /// Targets that are the source itself are skipped. Fresh harden
    /// snapshots are built for the source and every target. The mode and
    /// the target ids are recorded on the collection.
    ///
    /// # Errors
    ///
    /// - [`LandmarkError::NoPropagationTargets`] if no target remains.
    /// - [`LandmarkError::NotConnected`] if `collection` is not connected to
    ///   `source`.
    /// - [`LandmarkError::RoiArrayNotFound`] in correspondent mode when the
    ///   source has no ROI array.
    /// - Any projection error in non-correspondent mode.
    pub fn propagate<'a>(
        &self,
        source: &mut SurfaceModel,
        collection: &mut LandmarkCollection,
        targets: impl IntoIterator<Item = &'a mut SurfaceModel>,
        mode: PropagationMode,
    ) -> LandmarkResult<Vec<PropagationReport>> {
        let mut targets: Vec<&mut SurfaceModel> = targets
            .into_iter()
            .filter(|t| t.id() != source.id())
            .collect();
        if targets.is_empty() {
            warn!(source = source.id(), "No model selected for propagation");
            return Err(LandmarkError::NoPropagationTargets);
        }

        if collection.attribute(keys::CONNECTED_MODEL_ID) != Some(source.id()) {
            return Err(LandmarkError::NotConnected {
                collection: collection.id().to_owned(),
                model: source.id().to_owned(),
            });
        }

        info!(
            source = source.id(),
            collection = collection.id(),
            targets = targets.len(),
            %mode,
            "Starting ROI propagation"
        );

        let source_snapshot = self.rebuild_snapshot(source);
        collection.set_attribute(keys::HARDEN_MODEL_ID, source_snapshot.name().to_owned());
        collection.set_attribute(keys::TYPE_OF_PROPAGATION, mode.as_str().to_owned());
        let target_ids: Vec<&str> = targets.iter().map(|t| t.id()).collect();
        collection.set_attribute(keys::MODEL_TO_PROP_LIST, serde_json::to_string(&target_ids)?);

        let array_name = roi_array_name(collection, &self.config, source);
        let mut reports = Vec::with_capacity(targets.len());

        for target in &mut targets {
            let snapshot = self.rebuild_snapshot(target);
            let mixed_clean_state = mode == PropagationMode::Correspondent
                && source.flag(keys::IS_CLEAN) != target.flag(keys::IS_CLEAN);
            let roi_vertex_count = match mode {
                PropagationMode::Correspondent => {
                    if mixed_clean_state {
                        warn!(
                            source = source.id(),
                            target = target.id(),
                            "Mixing cleaned and uncleaned meshes; vertex ordering may differ"
                        );
                    }
                    let array = propagate_correspondent(source, target, &array_name)?;
                    MeshRegion::from_scalar_array(&array).vertex_count()
                }
                PropagationMode::NonCorrespondent => {
                    propagate_non_correspondent(collection, target, &snapshot, &array_name)?
                        .vertex_count()
                }
            };
            reports.push(PropagationReport {
                model_id: target.id().to_owned(),
                mode,
                array_name: array_name.clone(),
                roi_vertex_count,
                mixed_clean_state,
            });
        }

        info!(source = source.id(), targets = reports.len(), "ROI propagation complete");
        Ok(reports)
    }

    fn rebuild_snapshot(&self, model: &mut SurfaceModel) -> HardenedMesh {
        let name = self.config.harden_name(model.name());
        model.set_attribute(keys::HARDEN_MODEL_ID, name.clone());
        HardenedMesh::from_model(model, name)
    }
}

/// Copy the array `array_name` from `source` onto `target` and make it the
/// active scalars there.
///
/// # Errors
///
/// [`LandmarkError::RoiArrayNotFound`] if `source` has no such array.
pub fn propagate_correspondent(
    source: &SurfaceModel,
    target: &mut SurfaceModel,
    array_name: &str,
) -> LandmarkResult<ScalarArray> {
    let array = source
        .scalar_array(array_name)
        .cloned()
        .ok_or_else(|| LandmarkError::RoiArrayNotFound {
            array: array_name.to_owned(),
        })?;

    debug!(
        source = source.id(),
        target = target.id(),
        source_vertices = source.mesh().vertices.len(),
        target_vertices = target.mesh().vertices.len(),
        same_topology = source.mesh().same_topology(target.mesh()),
        array = array_name,
        "Copying ROI array"
    );

    target.attach_array(array.clone());
    Ok(array)
}

/// Re-derive the ROI of `collection` on `target`'s own topology.
///
/// Each landmark with a positive radius is located on `snapshot` (the
/// target's harden snapshot) and expanded there; the union is written onto
/// `target` as `array_name`.
///
/// # Errors
///
/// Fails if the collection has no description, `snapshot` is stale for
/// `target`, or `snapshot` has no vertices while some landmark has a
/// radius.
pub fn propagate_non_correspondent(
    collection: &LandmarkCollection,
    target: &mut SurfaceModel,
    snapshot: &HardenedMesh,
    array_name: &str,
) -> LandmarkResult<MeshRegion> {
    snapshot.ensure_current(target)?;
    let descriptions = load_descriptions(collection)?;

    let mut seeds = Vec::new();
    for (id, description) in descriptions.iter() {
        let hops = description.hop_count();
        if hops == 0 {
            continue;
        }
        let Some(position) = collection.position(id) else {
            warn!(landmark = %id, "Described landmark missing from collection; skipped");
            continue;
        };
        let (index, _) = snapshot.closest_vertex(&position)?;
        debug!(landmark = %id, target = target.id(), vertex = index, hops, "Located landmark on target");
        seeds.push((index, hops));
    }

    let vertices = expand_neighborhoods(snapshot.adjacency(), seeds)?;
    let region = MeshRegion::from_vertices(array_name, vertices);
    target.attach_roi(&region);
    Ok(region)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{AutoConfirm, LandmarkLogic};
    use mesh_region::fixtures::uv_sphere;
    use mesh_transform::Transform3D;

    /// Source sphere connected to a collection with one landmark pinned to
    /// `vertex` at `radius`.
    fn scene(vertex: u32, radius: f64) -> (SurfaceModel, LandmarkCollection) {
        let mut logic = LandmarkLogic::new(LandmarkConfig::unattended());
        let mut source = SurfaceModel::new("t0", "t0", uv_sphere(100.0, 8, 8));
        let mut collection = LandmarkCollection::new("F", "F");
        let snapshot = logic.model_changed(&mut source);
        logic
            .connect(&mut collection, &mut source, &snapshot, &mut AutoConfirm(true))
            .unwrap();

        let id = collection.add(snapshot.vertex_position(vertex).unwrap());
        logic
            .landmark_added(&mut collection, &id, &snapshot, &mut source)
            .unwrap();
        logic
            .set_roi_radius(&mut collection, &id, radius, &snapshot, &mut source)
            .unwrap();
        (source, collection)
    }

    #[test]
    fn correspondent_copy_is_exact() {
        let (mut source, mut collection) = scene(35, 2.0);
        let mut t1 = SurfaceModel::new("t1", "t1", uv_sphere(120.0, 8, 8));
        let mut t2 = SurfaceModel::new("t2", "t2", uv_sphere(90.0, 8, 8));

        let reports = Propagator::default()
            .propagate(
                &mut source,
                &mut collection,
                [&mut t1, &mut t2],
                PropagationMode::Correspondent,
            )
            .unwrap();

        let source_values = source.scalar_array("t0_ROI").unwrap().values().to_vec();
        for target in [&t1, &t2] {
            let copied = target.scalar_array("t0_ROI").unwrap();
            assert_eq!(copied.values(), source_values.as_slice());
            assert_eq!(target.mesh().point_data.active().map(ScalarArray::name), Some("t0_ROI"));
        }
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.roi_vertex_count == 19));

        assert_eq!(
            collection.attribute(keys::TYPE_OF_PROPAGATION),
            Some("correspondentShapes")
        );
        assert_eq!(
            collection.attribute(keys::MODEL_TO_PROP_LIST),
            Some(r#"["t1","t2"]"#)
        );
        assert!(t1.attribute(keys::HARDEN_MODEL_ID).is_some());
    }

    #[test]
    fn clean_state_is_compared_between_source_and_target() {
        let (mut source, mut collection) = scene(9, 1.0);
        source.set_flag(keys::IS_CLEAN, true);
        let mut cleaned = SurfaceModel::new("t1", "t1", uv_sphere(100.0, 8, 8));
        cleaned.set_flag(keys::IS_CLEAN, true);
        let mut raw = SurfaceModel::new("t2", "t2", uv_sphere(100.0, 8, 8));

        // The collection flag was reset on connect and plays no part.
        assert!(!collection.flag(keys::IS_CLEAN));
        let reports = Propagator::default()
            .propagate(
                &mut source,
                &mut collection,
                [&mut cleaned, &mut raw],
                PropagationMode::Correspondent,
            )
            .unwrap();

        assert!(!reports[0].mixed_clean_state);
        assert!(reports[1].mixed_clean_state);
    }

    #[test]
    fn source_is_filtered_from_targets() {
        let (mut source, mut collection) = scene(9, 1.0);
        let mut same = SurfaceModel::new("t0", "copy", uv_sphere(100.0, 8, 8));
        let result = Propagator::default().propagate(
            &mut source,
            &mut collection,
            [&mut same],
            PropagationMode::Correspondent,
        );
        assert!(matches!(result, Err(LandmarkError::NoPropagationTargets)));

        let none: [&mut SurfaceModel; 0] = [];
        let result = Propagator::default().propagate(
            &mut source,
            &mut collection,
            none,
            PropagationMode::NonCorrespondent,
        );
        assert!(matches!(result, Err(LandmarkError::NoPropagationTargets)));
        assert!(collection.attribute(keys::TYPE_OF_PROPAGATION).is_none());
    }

    #[test]
    fn missing_source_array() {
        let mut source = SurfaceModel::new("a", "a", uv_sphere(1.0, 8, 8));
        let mut target = SurfaceModel::new("b", "b", uv_sphere(1.0, 8, 8));
        assert!(matches!(
            propagate_correspondent(&source, &mut target, "a_ROI"),
            Err(LandmarkError::RoiArrayNotFound { .. })
        ));

        source.attach_roi(&MeshRegion::from_vertices("a_ROI", [1, 2]));
        let copied = propagate_correspondent(&source, &mut target, "a_ROI").unwrap();
        assert_eq!(copied.get(1), Some(1.0));
        assert_eq!(target.generation(), 0);
    }

    #[test]
    fn unconnected_collection_is_rejected() {
        let mut source = SurfaceModel::new("a", "a", uv_sphere(1.0, 8, 8));
        let mut target = SurfaceModel::new("b", "b", uv_sphere(1.0, 8, 8));
        let mut collection = LandmarkCollection::new("F", "F");
        assert!(matches!(
            Propagator::default().propagate(
                &mut source,
                &mut collection,
                [&mut target],
                PropagationMode::Correspondent,
            ),
            Err(LandmarkError::NotConnected { .. })
        ));
    }

    #[test]
    fn non_correspondent_rederives_on_target_topology() {
        let (mut source, mut collection) = scene(35, 2.0);
        let mut scaled = SurfaceModel::new("t1", "t1", uv_sphere(100.0, 8, 8));
        scaled.set_transform(Some(Transform3D::uniform_scale(1.02)));
        let mut finer = SurfaceModel::new("t2", "t2", uv_sphere(100.0, 16, 12));

        let reports = Propagator::default()
            .propagate(
                &mut source,
                &mut collection,
                [&mut scaled, &mut finer],
                PropagationMode::NonCorrespondent,
            )
            .unwrap();

        let expected = source.scalar_array("t0_ROI").unwrap().values().to_vec();
        assert_eq!(scaled.scalar_array("t0_ROI").unwrap().values(), expected.as_slice());
        assert_eq!(reports[0].roi_vertex_count, 19);

        let fine = finer.scalar_array("t0_ROI").unwrap();
        assert_eq!(fine.len(), finer.mesh().vertices.len());
        assert_eq!(fine.nonzero_indices().count(), reports[1].roi_vertex_count);
        assert!(reports[1].roi_vertex_count > 0);
        assert_eq!(
            collection.attribute(keys::TYPE_OF_PROPAGATION),
            Some("nonCorrespondentShapes")
        );
    }

    #[test]
    fn non_correspondent_is_deterministic() {
        let (_source, collection) = scene(9, 3.0);
        let mut target = SurfaceModel::new("t1", "t1", uv_sphere(100.0, 12, 9));
        let config = LandmarkConfig::default();
        let name = config.harden_name(target.name());
        let snapshot = HardenedMesh::from_model(&target, name);

        let first =
            propagate_non_correspondent(&collection, &mut target, &snapshot, "t0_ROI").unwrap();
        let first_values = target.scalar_array("t0_ROI").unwrap().values().to_vec();
        let second =
            propagate_non_correspondent(&collection, &mut target, &snapshot, "t0_ROI").unwrap();

        assert_eq!(first.sorted_vertices(), second.sorted_vertices());
        assert_eq!(target.scalar_array("t0_ROI").unwrap().values(), first_values.as_slice());
    }
}
