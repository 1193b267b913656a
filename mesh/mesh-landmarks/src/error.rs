//! Error types for landmark operations.

use mesh_region::RegionError;
use thiserror::Error;

use crate::LandmarkId;

/// Result type for landmark operations.
pub type LandmarkResult<T> = Result<T, LandmarkError>;

/// Errors that can occur while maintaining landmark descriptions or
/// propagating ROIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LandmarkError {
    /// The collection has no description, or is connected to another model.
    #[error("landmark collection '{collection}' is not connected to model '{model}'")]
    NotConnected {
        /// Collection id.
        collection: String,
        /// Model id the operation expected.
        model: String,
    },

    /// Every propagation target was the source model itself, or none was given.
    #[error("select at least one model other than the source for propagation")]
    NoPropagationTargets,

    /// The source model carries no ROI array to copy.
    #[error("no ROI array named '{array}' found; define one before propagating")]
    RoiArrayNotFound {
        /// Expected array name.
        array: String,
    },

    /// A landmark id that is not part of the collection or its description.
    #[error("unknown landmark '{0}'")]
    UnknownLandmark(LandmarkId),

    /// A midpoint parent that is not allowed.
    #[error("landmark '{id}' cannot be a midpoint parent: {reason}")]
    InvalidMidpointParent {
        /// The rejected parent.
        id: LandmarkId,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The harden snapshot was built from another model or an older version
    /// of this one.
    #[error("harden snapshot '{snapshot}' is stale for model '{model}'")]
    StaleSnapshot {
        /// Snapshot name.
        snapshot: String,
        /// Model id.
        model: String,
    },

    /// The persisted description could not be parsed or written.
    #[error("malformed landmark description: {0}")]
    Description(#[from] serde_json::Error),

    /// The persisted description has a version this build does not read.
    #[error("unsupported landmark description version {found} (expected {expected})")]
    UnsupportedDescriptionVersion {
        /// Version found in the document.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// The user declined a confirmation prompt.
    #[error("operation cancelled")]
    Cancelled,

    /// Mesh lookup failed.
    #[error(transparent)]
    Region(#[from] RegionError),
}
