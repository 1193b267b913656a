//! Keeping landmark descriptions in step with landmark and model edits.
//!
//! [`LandmarkLogic`] owns no scene state. Every entry point takes the
//! collection, the connected [`SurfaceModel`] and its current
//! [`HardenedMesh`] explicitly; the host wires its change notifications to
//! the matching method:
//!
//! | Host event | Method |
//! |------------|--------|
//! | model selected | [`model_changed`](LandmarkLogic::model_changed) then [`connect`](LandmarkLogic::connect) |
//! | landmark added | [`landmark_added`](LandmarkLogic::landmark_added) |
//! | landmark moved | [`landmark_moved`](LandmarkLogic::landmark_moved) |
//! | landmark removed | [`landmark_removed`](LandmarkLogic::landmark_removed) |
//! | model geometry or transform edited | [`model_modified`](LandmarkLogic::model_modified) |
//!
//! The description is read from and written back to the collection's
//! `landmarkDescription` attribute on every call.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use hashbrown::HashMap;
use mesh_region::{CleanSummary, MeshRegion, clean_mesh, expand_neighborhoods};
use tracing::{debug, info, warn};

use crate::{
    AttributeStore, ConfirmPrompt, ConfirmRequest, HardenedMesh, LandmarkCollection,
    LandmarkConfig, LandmarkDescription, LandmarkDescriptions, LandmarkError, LandmarkId,
    LandmarkObserver, LandmarkResult, MidPoint, SurfaceModel, keys,
};

/// What [`LandmarkLogic::connect`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// First connection: a description was created.
    Initialized,
    /// Moved from another model: landmarks were reprojected.
    Reprojected,
    /// Already connected to this model: only the snapshot name changed.
    Refreshed,
}

/// Result of [`LandmarkLogic::clean_connected_model`].
#[derive(Debug)]
pub struct CleanOutcome {
    /// What cleaning changed.
    pub summary: CleanSummary,
    /// Snapshot of the cleaned model.
    pub snapshot: HardenedMesh,
    /// ROI recomputed on the cleaned topology.
    pub region: MeshRegion,
}

/// Event handlers for a landmark collection connected to a surface model.
pub struct LandmarkLogic {
    config: LandmarkConfig,
    observers: Vec<Box<dyn LandmarkObserver>>,
}

impl fmt::Debug for LandmarkLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandmarkLogic")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for LandmarkLogic {
    fn default() -> Self {
        Self::new(LandmarkConfig::default())
    }
}

impl LandmarkLogic {
    /// Create handlers with the given configuration.
    #[must_use]
    pub fn new(config: LandmarkConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &LandmarkConfig {
        &self.config
    }

    /// Register an observer.
    pub fn add_observer(&mut self, observer: Box<dyn LandmarkObserver>) {
        self.observers.push(observer);
    }

    // ==================== Connection ====================

    /// Build the harden snapshot for a newly selected model and record its
    /// name on the model.
    pub fn model_changed(&self, model: &mut SurfaceModel) -> HardenedMesh {
        let name = self.config.harden_name(model.name());
        model.set_attribute(keys::HARDEN_MODEL_ID, name.clone());
        HardenedMesh::from_model(model, name)
    }

    /// Connect `collection` to `model`.
    ///
    /// A transform on the collection is flattened first. A collection that
    /// was never connected is initialized; one connected elsewhere is
    /// reprojected onto `model`.
    ///
    /// # Errors
    ///
    /// [`LandmarkError::Cancelled`] if the host declines a prompt,
    /// [`LandmarkError::StaleSnapshot`] if `snapshot` does not match `model`,
    /// or any projection error.
    pub fn connect(
        &mut self,
        collection: &mut LandmarkCollection,
        model: &mut SurfaceModel,
        snapshot: &HardenedMesh,
        prompt: &mut dyn ConfirmPrompt,
    ) -> LandmarkResult<ConnectOutcome> {
        snapshot.ensure_current(model)?;

        if collection.is_under_transform() {
            let request = ConfirmRequest::HardenLandmarkTransform {
                collection: collection.id().to_owned(),
            };
            if self.config.confirm_harden_landmarks && !prompt.confirm(&request) {
                return Err(LandmarkError::Cancelled);
            }
            collection.harden_transform();
        }

        let previous = collection
            .attribute(keys::CONNECTED_MODEL_ID)
            .filter(|_| collection.attribute(keys::LANDMARK_DESCRIPTION).is_some())
            .map(str::to_owned);

        let outcome = match previous {
            None => {
                self.initialize(collection, model, snapshot)?;
                ConnectOutcome::Initialized
            }
            Some(previous) if previous == model.id() => {
                collection.set_attribute(keys::HARDEN_MODEL_ID, snapshot.name().to_owned());
                ConnectOutcome::Refreshed
            }
            Some(previous) => {
                let request = ConfirmRequest::ReprojectOntoNewModel {
                    collection: collection.id().to_owned(),
                    previous_model: previous,
                    new_model: model.id().to_owned(),
                };
                if self.config.confirm_reprojection && !prompt.confirm(&request) {
                    return Err(LandmarkError::Cancelled);
                }
                self.connected_model_changed(collection, model, snapshot)?;
                ConnectOutcome::Reprojected
            }
        };

        info!(
            collection = collection.id(),
            model = model.id(),
            ?outcome,
            "Connected landmarks to model"
        );
        Ok(outcome)
    }

    /// Create a fresh description for every landmark of `collection`.
    ///
    /// Landmarks are projected when the configuration says so. Radii start
    /// at zero, so no ROI is produced.
    ///
    /// # Errors
    ///
    /// Fails if `snapshot` is stale or projection fails.
    pub fn initialize(
        &mut self,
        collection: &mut LandmarkCollection,
        model: &SurfaceModel,
        snapshot: &HardenedMesh,
    ) -> LandmarkResult<()> {
        snapshot.ensure_current(model)?;
        self.write_connection(collection, model, snapshot);

        let project = self.config.project_on_surface_by_default;
        let mut descriptions = LandmarkDescriptions::new();
        for landmark in collection.iter() {
            descriptions.insert(
                landmark.id.clone(),
                LandmarkDescription::new(landmark.label.clone(), project),
            );
        }
        if project {
            for id in collection.ids() {
                project_landmark(collection, &mut descriptions, &id, snapshot)?;
            }
        }

        info!(
            collection = collection.id(),
            landmarks = descriptions.len(),
            projected = project,
            "Created landmark description"
        );
        store_descriptions(collection, &descriptions)
    }

    /// Move an already described collection onto another model.
    ///
    /// Projected landmarks are relocated on `snapshot` when projection is on
    /// by default and unprojected otherwise. The ROI array is renamed after
    /// the new model and rebuilt there.
    ///
    /// # Errors
    ///
    /// Fails if the collection has no description, `snapshot` is stale, or
    /// projection fails.
    pub fn connected_model_changed(
        &mut self,
        collection: &mut LandmarkCollection,
        model: &mut SurfaceModel,
        snapshot: &HardenedMesh,
    ) -> LandmarkResult<MeshRegion> {
        snapshot.ensure_current(model)?;
        let mut descriptions = load_descriptions(collection)?;
        self.write_connection(collection, model, snapshot);

        let ids: Vec<LandmarkId> = descriptions.iter().map(|(id, _)| id.clone()).collect();
        for id in &ids {
            let projected = descriptions.require(id)?.projection.is_projected;
            if projected && self.config.project_on_surface_by_default {
                project_landmark(collection, &mut descriptions, id, snapshot)?;
            } else {
                descriptions.require_mut(id)?.unproject();
            }
        }
        let moved = refresh_midpoints(collection, &mut descriptions, &ids, snapshot)?;
        store_descriptions(collection, &descriptions)?;

        self.notify_moved(collection, &moved);
        self.find_roi_with(collection, &descriptions, snapshot, model)
    }

    /// Drop the description and every cross-reference attribute.
    ///
    /// Returns `true` if the collection was connected.
    pub fn disconnect(&self, collection: &mut LandmarkCollection) -> bool {
        let was_connected = collection.attribute(keys::LANDMARK_DESCRIPTION).is_some();
        for key in keys::COLLECTION_KEYS {
            collection.remove_attribute(key);
        }
        if was_connected {
            info!(collection = collection.id(), "Disconnected landmarks");
        }
        was_connected
    }

    fn write_connection(
        &self,
        collection: &mut LandmarkCollection,
        model: &SurfaceModel,
        snapshot: &HardenedMesh,
    ) {
        collection.set_attribute(keys::CONNECTED_MODEL_ID, model.id().to_owned());
        collection.set_attribute(keys::HARDEN_MODEL_ID, snapshot.name().to_owned());
        collection.set_attribute(keys::ARRAY_NAME, self.config.roi_array_name(model.name()));
        collection.set_flag(keys::IS_CLEAN, false);
    }

    // ==================== Landmark events ====================

    /// Describe a newly placed landmark and project it.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model`, the landmark is
    /// unknown, or projection fails.
    pub fn landmark_added(
        &mut self,
        collection: &mut LandmarkCollection,
        id: &LandmarkId,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        let mut descriptions = require_connected(collection, model)?;
        let label = collection
            .get(id)
            .map(|l| l.label.clone())
            .ok_or_else(|| LandmarkError::UnknownLandmark(id.clone()))?;
        descriptions.insert(id.clone(), LandmarkDescription::new(label, true));
        store_descriptions(collection, &descriptions)?;

        debug!(collection = collection.id(), landmark = %id, "Landmark added");
        self.landmark_moved(collection, id, snapshot, model)
    }

    /// Re-project a moved landmark, update every midpoint that depends on
    /// it and rebuild the ROI.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model`, `snapshot` is
    /// stale, the landmark is unknown, or projection fails.
    pub fn landmark_moved(
        &mut self,
        collection: &mut LandmarkCollection,
        id: &LandmarkId,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        snapshot.ensure_current(model)?;
        let mut descriptions = require_connected(collection, model)?;

        if descriptions.require(id)?.projection.is_projected {
            project_landmark(collection, &mut descriptions, id, snapshot)?;
        } else if collection.get(id).is_none() {
            return Err(LandmarkError::UnknownLandmark(id.clone()));
        }

        let mut moved = vec![id.clone()];
        moved.extend(refresh_midpoints(
            collection,
            &mut descriptions,
            std::slice::from_ref(id),
            snapshot,
        )?);
        store_descriptions(collection, &descriptions)?;

        self.notify_moved(collection, &moved);
        self.find_roi_with(collection, &descriptions, snapshot, model)
    }

    /// Forget a landmark the host has removed.
    ///
    /// The id is dropped from every dependents list, and midpoints that
    /// used it as a parent become ordinary landmarks. Returns those
    /// midpoints. The ROI is not rebuilt; call [`find_roi`](Self::find_roi).
    ///
    /// # Errors
    ///
    /// Fails if the collection has no description.
    pub fn landmark_removed(
        &mut self,
        collection: &mut LandmarkCollection,
        id: &LandmarkId,
    ) -> LandmarkResult<Vec<LandmarkId>> {
        let mut descriptions = load_descriptions(collection)?;
        if descriptions.remove(id).is_none() {
            return Err(LandmarkError::UnknownLandmark(id.clone()));
        }

        let orphans: Vec<LandmarkId> = descriptions
            .iter()
            .filter(|(_, d)| {
                d.is_midpoint()
                    && (d.mid_point.point1.as_ref() == Some(id)
                        || d.mid_point.point2.as_ref() == Some(id))
            })
            .map(|(orphan, _)| orphan.clone())
            .collect();

        for orphan in &orphans {
            warn!(
                collection = collection.id(),
                midpoint = %orphan,
                removed = %id,
                "Midpoint parent removed; keeping it as an ordinary landmark"
            );
            descriptions.require_mut(orphan)?.demote_midpoint();
        }

        for (_, description) in descriptions.iter_mut() {
            description
                .mid_point
                .defined_by_this_markup
                .retain(|d| d != id && !orphans.contains(d));
        }

        store_descriptions(collection, &descriptions)?;
        Ok(orphans)
    }

    /// Add a landmark at the midpoint of two others and keep it there.
    ///
    /// # Errors
    ///
    /// [`LandmarkError::InvalidMidpointParent`] for identical parents or a
    /// parent that is itself a midpoint (unless allowed by the config),
    /// [`LandmarkError::UnknownLandmark`] for a missing parent, or a
    /// connection or projection error.
    pub fn define_midpoint(
        &mut self,
        collection: &mut LandmarkCollection,
        parent1: &LandmarkId,
        parent2: &LandmarkId,
        on_surface: bool,
        snapshot: &HardenedMesh,
        model: &SurfaceModel,
    ) -> LandmarkResult<LandmarkId> {
        let mut descriptions = require_connected(collection, model)?;

        if parent1 == parent2 {
            return Err(LandmarkError::InvalidMidpointParent {
                id: parent2.clone(),
                reason: "both parents are the same landmark",
            });
        }
        for parent in [parent1, parent2] {
            if descriptions.require(parent)?.is_midpoint() && !self.config.allow_midpoint_parents
            {
                return Err(LandmarkError::InvalidMidpointParent {
                    id: parent.clone(),
                    reason: "it is itself a midpoint",
                });
            }
        }

        let (a, b) = match (collection.position(parent1), collection.position(parent2)) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => return Err(LandmarkError::UnknownLandmark(parent1.clone())),
            (_, None) => return Err(LandmarkError::UnknownLandmark(parent2.clone())),
        };
        if on_surface {
            snapshot.ensure_current(model)?;
        }

        let id = collection.add(nalgebra::center(&a, &b));
        let label = collection
            .get(&id)
            .map(|l| l.label.clone())
            .unwrap_or_default();

        let mut description = LandmarkDescription::new(label, false);
        description.mid_point = MidPoint {
            is_mid_point: true,
            point1: Some(parent1.clone()),
            point2: Some(parent2.clone()),
            defined_by_this_markup: Vec::new(),
        };
        descriptions.insert(id.clone(), description);
        for parent in [parent1, parent2] {
            descriptions
                .require_mut(parent)?
                .mid_point
                .defined_by_this_markup
                .push(id.clone());
        }

        let attached = if on_surface {
            project_landmark(collection, &mut descriptions, &id, snapshot)
        } else {
            Ok(())
        }
        .and_then(|()| store_descriptions(collection, &descriptions));
        if let Err(e) = attached {
            // Every landmark in the collection must have a description.
            collection.remove(&id);
            return Err(e);
        }

        debug!(
            collection = collection.id(),
            midpoint = %id,
            %parent1,
            %parent2,
            on_surface,
            "Defined midpoint"
        );
        self.notify_moved(collection, std::slice::from_ref(&id));
        Ok(id)
    }

    /// Pin a landmark to the surface or release it.
    ///
    /// Releasing also resets its radius to zero. Either way the ROI is
    /// rebuilt.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model`, `snapshot` is
    /// stale, the landmark is unknown, or projection fails.
    pub fn set_projected(
        &mut self,
        collection: &mut LandmarkCollection,
        id: &LandmarkId,
        on_surface: bool,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        snapshot.ensure_current(model)?;
        let mut descriptions = require_connected(collection, model)?;

        let mut moved = Vec::new();
        if on_surface {
            project_landmark(collection, &mut descriptions, id, snapshot)?;
            moved.push(id.clone());
            moved.extend(refresh_midpoints(
                collection,
                &mut descriptions,
                std::slice::from_ref(id),
                snapshot,
            )?);
        } else {
            descriptions.require_mut(id)?.unproject();
        }
        store_descriptions(collection, &descriptions)?;

        self.notify_moved(collection, &moved);
        self.find_roi_with(collection, &descriptions, snapshot, model)
    }

    /// Change a landmark's ROI radius and rebuild the ROI.
    ///
    /// A landmark that is not on the surface is projected first. Negative
    /// and NaN radii are stored as zero.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model`, `snapshot` is
    /// stale, the landmark is unknown, or projection fails.
    pub fn set_roi_radius(
        &mut self,
        collection: &mut LandmarkCollection,
        id: &LandmarkId,
        radius: f64,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        snapshot.ensure_current(model)?;
        let mut descriptions = require_connected(collection, model)?;

        let mut moved = Vec::new();
        if !descriptions.require(id)?.projection.is_projected {
            project_landmark(collection, &mut descriptions, id, snapshot)?;
            moved.push(id.clone());
            moved.extend(refresh_midpoints(
                collection,
                &mut descriptions,
                std::slice::from_ref(id),
                snapshot,
            )?);
        }
        descriptions.require_mut(id)?.roi_radius = radius.max(0.0);
        store_descriptions(collection, &descriptions)?;

        self.notify_moved(collection, &moved);
        self.find_roi_with(collection, &descriptions, snapshot, model)
    }

    // ==================== Model events ====================

    /// React to an edit of the connected model's geometry or transform.
    ///
    /// Builds a new snapshot. Each projected landmark follows the vertex it
    /// was pinned to when that index still exists, and is relocated
    /// otherwise. Midpoints and the ROI are then refreshed.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model` or projection
    /// fails.
    pub fn model_modified(
        &mut self,
        collection: &mut LandmarkCollection,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<HardenedMesh> {
        let mut descriptions = require_connected(collection, model)?;
        let snapshot = self.model_changed(model);
        collection.set_attribute(keys::HARDEN_MODEL_ID, snapshot.name().to_owned());

        let ids: Vec<LandmarkId> = descriptions.iter().map(|(id, _)| id.clone()).collect();
        let mut moved = Vec::new();
        for id in &ids {
            let projection = descriptions.require(id)?.projection.clone();
            if !projection.is_projected {
                continue;
            }
            let pinned = projection
                .closest_point_index
                .and_then(|index| snapshot.vertex_position(index));
            match pinned {
                Some(position) => {
                    collection.set_position(id, position);
                }
                None => project_landmark(collection, &mut descriptions, id, &snapshot)?,
            }
            moved.push(id.clone());
        }
        moved.extend(refresh_midpoints(collection, &mut descriptions, &ids, &snapshot)?);
        store_descriptions(collection, &descriptions)?;

        info!(
            collection = collection.id(),
            model = model.id(),
            generation = model.generation(),
            moved = moved.len(),
            "Followed model edit"
        );
        self.notify_moved(collection, &moved);
        self.find_roi_with(collection, &descriptions, &snapshot, model)?;
        Ok(snapshot)
    }

    /// Clean the connected model and re-anchor everything on the result.
    ///
    /// # Errors
    ///
    /// [`LandmarkError::Cancelled`] if the host declines, or a connection or
    /// projection error.
    pub fn clean_connected_model(
        &mut self,
        collection: &mut LandmarkCollection,
        model: &mut SurfaceModel,
        prompt: &mut dyn ConfirmPrompt,
    ) -> LandmarkResult<CleanOutcome> {
        let mut descriptions = require_connected(collection, model)?;
        let request = ConfirmRequest::CleanModel {
            model: model.id().to_owned(),
        };
        if !prompt.confirm(&request) {
            return Err(LandmarkError::Cancelled);
        }

        let summary = clean_mesh(model.mesh_mut(), &self.config.clean_params());
        let snapshot = self.model_changed(model);
        collection.set_attribute(keys::HARDEN_MODEL_ID, snapshot.name().to_owned());

        let ids: Vec<LandmarkId> = descriptions.iter().map(|(id, _)| id.clone()).collect();
        let mut moved = Vec::new();
        for id in &ids {
            if descriptions.require(id)?.projection.is_projected {
                project_landmark(collection, &mut descriptions, id, &snapshot)?;
                moved.push(id.clone());
            }
        }
        moved.extend(refresh_midpoints(collection, &mut descriptions, &ids, &snapshot)?);

        collection.set_flag(keys::IS_CLEAN, true);
        model.set_flag(keys::IS_CLEAN, true);
        store_descriptions(collection, &descriptions)?;

        info!(
            model = model.id(),
            merged = summary.vertices_merged,
            removed_faces = summary.faces_collapsed + summary.degenerate_faces_removed,
            vertices = snapshot.vertex_count(),
            "Cleaned connected model"
        );
        self.notify_moved(collection, &moved);
        let region = self.find_roi_with(collection, &descriptions, &snapshot, model)?;

        Ok(CleanOutcome {
            summary,
            snapshot,
            region,
        })
    }

    // ==================== Queries ====================

    /// Rebuild the ROI of `collection` and write it onto `model`.
    ///
    /// # Errors
    ///
    /// Fails if the collection is not connected to `model` or `snapshot` is
    /// stale.
    pub fn find_roi(
        &mut self,
        collection: &LandmarkCollection,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        let descriptions = require_connected(collection, model)?;
        self.find_roi_with(collection, &descriptions, snapshot, model)
    }

    fn find_roi_with(
        &mut self,
        collection: &LandmarkCollection,
        descriptions: &LandmarkDescriptions,
        snapshot: &HardenedMesh,
        model: &mut SurfaceModel,
    ) -> LandmarkResult<MeshRegion> {
        snapshot.ensure_current(model)?;
        let region = derive_region(
            descriptions,
            snapshot,
            &roi_array_name(collection, &self.config, model),
        )?;
        model.attach_roi(&region);

        debug!(
            collection = collection.id(),
            array = region.name(),
            size = region.vertex_count(),
            "ROI updated"
        );
        for observer in &mut self.observers {
            observer.roi_updated(collection, &region);
        }
        Ok(region)
    }

    fn notify_moved(&mut self, collection: &LandmarkCollection, ids: &[LandmarkId]) {
        for id in ids {
            for observer in &mut self.observers {
                observer.landmark_moved(collection, id);
            }
        }
    }

    /// Id of the first landmark carrying `label`.
    #[must_use]
    pub fn find_id_from_label(
        &self,
        collection: &LandmarkCollection,
        label: &str,
    ) -> Option<LandmarkId> {
        collection.find_by_label(label).map(|l| l.id.clone())
    }

    /// Labels of the landmarks a host should offer in its lists, in
    /// collection order. Midpoints are left out unless `include_midpoints`.
    #[must_use]
    pub fn selectable_landmarks(
        &self,
        collection: &LandmarkCollection,
        include_midpoints: bool,
    ) -> Vec<String> {
        let descriptions = load_descriptions(collection).unwrap_or_default();
        collection
            .iter()
            .filter(|l| {
                include_midpoints
                    || !descriptions
                        .get(&l.id)
                        .is_some_and(LandmarkDescription::is_midpoint)
            })
            .map(|l| l.label.clone())
            .collect()
    }
}

// ==================== Description persistence ====================

/// Read the description of `collection`.
///
/// # Errors
///
/// [`LandmarkError::NotConnected`] if there is none, or a decoding error.
pub fn load_descriptions(collection: &LandmarkCollection) -> LandmarkResult<LandmarkDescriptions> {
    let Some(json) = collection.attribute(keys::LANDMARK_DESCRIPTION) else {
        return Err(LandmarkError::NotConnected {
            collection: collection.id().to_owned(),
            model: collection
                .attribute(keys::CONNECTED_MODEL_ID)
                .unwrap_or_default()
                .to_owned(),
        });
    };
    LandmarkDescriptions::from_json(json)
}

/// Write the description of `collection`.
///
/// # Errors
///
/// Fails only if encoding fails.
pub fn store_descriptions(
    collection: &mut LandmarkCollection,
    descriptions: &LandmarkDescriptions,
) -> LandmarkResult<()> {
    collection.set_attribute(keys::LANDMARK_DESCRIPTION, descriptions.to_json()?);
    Ok(())
}

fn require_connected(
    collection: &LandmarkCollection,
    model: &SurfaceModel,
) -> LandmarkResult<LandmarkDescriptions> {
    if collection.attribute(keys::CONNECTED_MODEL_ID) != Some(model.id()) {
        return Err(LandmarkError::NotConnected {
            collection: collection.id().to_owned(),
            model: model.id().to_owned(),
        });
    }
    load_descriptions(collection)
}

pub(crate) fn roi_array_name(
    collection: &LandmarkCollection,
    config: &LandmarkConfig,
    model: &SurfaceModel,
) -> String {
    collection
        .attribute(keys::ARRAY_NAME)
        .map_or_else(|| config.roi_array_name(model.name()), str::to_owned)
}

// ==================== Projection and ROI ====================

/// Snap a landmark onto the closest snapshot vertex and record the index.
fn project_landmark(
    collection: &mut LandmarkCollection,
    descriptions: &mut LandmarkDescriptions,
    id: &LandmarkId,
    snapshot: &HardenedMesh,
) -> LandmarkResult<()> {
    let position = collection
        .position(id)
        .ok_or_else(|| LandmarkError::UnknownLandmark(id.clone()))?;
    let description = descriptions.require_mut(id)?;

    let (index, surface) = snapshot.closest_vertex(&position).inspect_err(|e| {
        warn!(landmark = %id, snapshot = snapshot.name(), error = %e, "Cannot project landmark");
    })?;
    collection.set_position(id, surface);
    description.projection.is_projected = true;
    description.projection.closest_point_index = Some(index);

    debug!(landmark = %id, vertex = index, "Projected landmark");
    Ok(())
}

/// Union of the neighborhoods of every landmark with a positive radius.
fn derive_region(
    descriptions: &LandmarkDescriptions,
    snapshot: &HardenedMesh,
    name: &str,
) -> LandmarkResult<MeshRegion> {
    let seeds: Vec<(u32, u32)> = descriptions
        .iter()
        .filter(|(_, d)| d.hop_count() > 0)
        .filter_map(|(id, d)| match d.projection.closest_point_index {
            Some(index) => Some((index, d.hop_count())),
            None => {
                debug!(landmark = %id, "Radius set on an unprojected landmark; skipped");
                None
            }
        })
        .collect();

    let vertices = expand_neighborhoods(snapshot.adjacency(), seeds)?;
    Ok(MeshRegion::from_vertices(name, vertices))
}

/// Recompute every midpoint that depends, directly or through other
/// midpoints, on one of `roots`.
///
/// Midpoints are visited parents-first, so one with two changed ancestors
/// is computed once from final parent positions. Returns the midpoints that
/// moved, in visiting order.
fn refresh_midpoints(
    collection: &mut LandmarkCollection,
    descriptions: &mut LandmarkDescriptions,
    roots: &[LandmarkId],
    snapshot: &HardenedMesh,
) -> LandmarkResult<Vec<LandmarkId>> {
    let mut affected: BTreeSet<LandmarkId> = BTreeSet::new();
    let mut stack: Vec<LandmarkId> = roots.to_vec();
    while let Some(id) = stack.pop() {
        let Some(description) = descriptions.get(&id) else {
            continue;
        };
        for dependent in &description.mid_point.defined_by_this_markup {
            if affected.insert(dependent.clone()) {
                stack.push(dependent.clone());
            }
        }
    }
    if affected.is_empty() {
        return Ok(Vec::new());
    }

    // Parents that are themselves waiting to be recomputed.
    let mut waiting_on: HashMap<LandmarkId, usize> = HashMap::new();
    for id in &affected {
        let count = descriptions
            .get(id)
            .and_then(LandmarkDescription::parents)
            .map_or(0, |(p1, p2)| {
                usize::from(affected.contains(p1)) + usize::from(affected.contains(p2))
            });
        waiting_on.insert(id.clone(), count);
    }

    let mut queue: VecDeque<LandmarkId> = affected
        .iter()
        .filter(|id| waiting_on.get(*id) == Some(&0))
        .cloned()
        .collect();
    let mut visited = Vec::with_capacity(affected.len());

    while let Some(id) = queue.pop_front() {
        let description = descriptions.require(&id)?;
        let dependents = description.mid_point.defined_by_this_markup.clone();
        let projected = description.projection.is_projected;
        let parents = description
            .parents()
            .map(|(p1, p2)| (p1.clone(), p2.clone()));

        if let Some((p1, p2)) = parents {
            match (collection.position(&p1), collection.position(&p2)) {
                (Some(a), Some(b)) => {
                    collection.set_position(&id, nalgebra::center(&a, &b));
                    if projected {
                        project_landmark(collection, descriptions, &id, snapshot)?;
                    }
                }
                _ => warn!(midpoint = %id, "Midpoint parent missing; position left as is"),
            }
        }
        visited.push(id);

        for dependent in dependents {
            if let Some(count) = waiting_on.get_mut(&dependent) {
                *count = count.saturating_sub(1);
                if *count == 0 && affected.contains(&dependent) {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if visited.len() < affected.len() {
        warn!(
            unresolved = affected.len() - visited.len(),
            "Midpoint dependencies form a cycle; those midpoints were not updated"
        );
    }
    Ok(visited)
}
