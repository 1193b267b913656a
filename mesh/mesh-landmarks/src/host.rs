//! Seams through which the host application takes part in landmark
//! operations.
//!
//! The host answers yes/no questions before destructive steps
//! ([`ConfirmPrompt`]) and may register [`LandmarkObserver`]s to hear about
//! moved landmarks and recomputed ROIs.

use std::fmt;

use mesh_region::MeshRegion;

use crate::{LandmarkCollection, LandmarkId};

/// A question the host is asked before a destructive step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfirmRequest {
    /// The collection sits under a transform that must be flattened into
    /// the landmark positions before connecting.
    HardenLandmarkTransform {
        /// Collection id.
        collection: String,
    },

    /// The collection is connected to another model; its landmarks will be
    /// reprojected onto the new one.
    ReprojectOntoNewModel {
        /// Collection id.
        collection: String,
        /// Model currently connected.
        previous_model: String,
        /// Model about to be connected.
        new_model: String,
    },

    /// Cleaning renumbers vertices and discards existing arrays.
    CleanModel {
        /// Model id.
        model: String,
    },
}

impl fmt::Display for ConfirmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardenLandmarkTransform { collection } => write!(
                f,
                "landmarks '{collection}' are under a transform; harden it before connecting?"
            ),
            Self::ReprojectOntoNewModel {
                collection,
                previous_model,
                new_model,
            } => write!(
                f,
                "landmarks '{collection}' are connected to '{previous_model}'; \
                 reproject them onto '{new_model}'?"
            ),
            Self::CleanModel { model } => write!(
                f,
                "cleaning '{model}' renumbers its vertices and drops its arrays; continue?"
            ),
        }
    }
}

/// Yes/no confirmation supplied by the host.
pub trait ConfirmPrompt {
    /// Return `true` to proceed.
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&ConfirmRequest) -> bool,
{
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// A prompt that always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, _request: &ConfirmRequest) -> bool {
        self.0
    }
}

/// Notified by [`LandmarkLogic`](crate::LandmarkLogic) after landmark edits.
pub trait LandmarkObserver {
    /// A landmark was moved (directly or as a dependent midpoint) and its
    /// projection is up to date.
    fn landmark_moved(&mut self, collection: &LandmarkCollection, id: &LandmarkId);

    /// The collection's ROI was recomputed.
    fn roi_updated(&mut self, _collection: &LandmarkCollection, _region: &MeshRegion) {}
}
