//! Landmarks pinned to surface models, and the regions of interest they
//! define.
//!
//! A [`LandmarkCollection`] is connected to one [`SurfaceModel`]. For every
//! landmark the crate keeps a [`LandmarkDescription`]: whether it is pinned
//! to the surface and at which vertex, its ROI radius, and whether it is the
//! midpoint of two other landmarks. The description is persisted as JSON in
//! the collection's attributes so it survives a host save/reload.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero UI or host dependencies**. The host
//! owns models and collections, forwards its change notifications to
//! [`LandmarkLogic`], and answers yes/no questions through
//! [`ConfirmPrompt`].
//!
//! # Overview
//!
//! - [`HardenedMesh`] - world-space copy of a model used for every lookup
//! - [`LandmarkLogic`] - connect, add, move, remove, midpoints, radii
//! - [`Propagator`] - carry an ROI onto other models
//! - [`LandmarkDescriptions`] - the typed, versioned description store
//!
//! # Quick Start
//!
//! ```
//! use mesh_landmarks::{
//!     AutoConfirm, LandmarkCollection, LandmarkConfig, LandmarkLogic, SurfaceModel,
//! };
//! use mesh_region::fixtures::uv_sphere;
//! use mesh_types::Point3;
//!
//! let mut logic = LandmarkLogic::new(LandmarkConfig::unattended());
//! let mut skull = SurfaceModel::new("m1", "skull", uv_sphere(100.0, 8, 8));
//! let mut points = LandmarkCollection::new("fid", "F");
//!
//! let snapshot = logic.model_changed(&mut skull);
//! logic.connect(&mut points, &mut skull, &snapshot, &mut AutoConfirm(true)).unwrap();
//!
//! // Placed slightly off the surface; projection snaps it onto the pole.
//! let nasion = points.add(Point3::new(0.5, 0.0, 101.0));
//! logic.landmark_added(&mut points, &nasion, &snapshot, &mut skull).unwrap();
//! assert_eq!(points.position(&nasion), Some(Point3::new(0.0, 0.0, 100.0)));
//!
//! let roi = logic.set_roi_radius(&mut points, &nasion, 1.0, &snapshot, &mut skull).unwrap();
//! assert_eq!(roi.vertex_count(), 9);
//! assert!(skull.scalar_array("skull_ROI").is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod attributes;
mod config;
mod description;
mod error;
mod host;
mod landmark;
mod logic;
mod model;
mod propagation;

pub use attributes::{AttributeStore, Attributes, keys};
pub use config::{LandmarkConfig, PropagationMode, UnknownPropagationMode};
pub use description::{
    DESCRIPTION_VERSION, LandmarkDescription, LandmarkDescriptions, MidPoint, Projection,
};
pub use error::{LandmarkError, LandmarkResult};
pub use host::{AutoConfirm, ConfirmPrompt, ConfirmRequest, LandmarkObserver};
pub use landmark::{Landmark, LandmarkCollection, LandmarkId};
pub use logic::{CleanOutcome, ConnectOutcome, LandmarkLogic, load_descriptions, store_descriptions};
pub use model::{HardenedMesh, SurfaceModel};
pub use propagation::{
    PropagationReport, Propagator, propagate_correspondent, propagate_non_correspondent,
};
