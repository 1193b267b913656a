//! Configuration for landmark handling and propagation.
//!
//! # Example
//!
//! ```
//! use mesh_landmarks::{LandmarkConfig, PropagationMode};
//!
//! let config = LandmarkConfig::default()
//!     .with_project_on_surface_by_default(false)
//!     .with_roi_array_suffix("_mask");
//! assert_eq!(config.roi_array_name("jaw"), "jaw_mask");
//!
//! let mode: PropagationMode = "nonCorrespondentShapes".parse().unwrap();
//! assert_eq!(mode, PropagationMode::NonCorrespondent);
//! ```

use std::fmt;
use std::str::FromStr;

use mesh_region::CleanParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an ROI is carried from the source model to other models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropagationMode {
    /// Models share vertex count and ordering; the ROI array is copied as is.
    #[default]
    #[serde(rename = "correspondentShapes")]
    Correspondent,

    /// Topology differs; the ROI is re-derived on every target from the
    /// landmark positions.
    #[serde(rename = "nonCorrespondentShapes")]
    NonCorrespondent,
}

impl PropagationMode {
    /// The value stored in the `typeOfPropagation` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correspondent => "correspondentShapes",
            Self::NonCorrespondent => "nonCorrespondentShapes",
        }
    }
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown propagation mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown propagation mode '{0}'")]
pub struct UnknownPropagationMode(pub String);

impl FromStr for PropagationMode {
    type Err = UnknownPropagationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correspondentShapes" => Ok(Self::Correspondent),
            "nonCorrespondentShapes" => Ok(Self::NonCorrespondent),
            other => Err(UnknownPropagationMode(other.to_owned())),
        }
    }
}

/// Settings for [`LandmarkLogic`](crate::LandmarkLogic) and
/// [`Propagator`](crate::Propagator).
///
/// Serializable so a host can keep it with its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Pin landmarks to the surface when a collection is first connected.
    /// Default: `true`
    pub project_on_surface_by_default: bool,

    /// Suffix appended to the model name to form the ROI array name.
    /// Default: `"_ROI"`
    pub roi_array_suffix: String,

    /// Prefix of harden snapshot names.
    /// Default: `"SurfaceRegistration_"`
    pub harden_name_prefix: String,

    /// Weld distance used when cleaning a connected model.
    /// Default: `1e-9`
    pub clean_weld_epsilon: f64,

    /// Ask before reprojecting a collection onto a different model.
    /// Default: `true`
    pub confirm_reprojection: bool,

    /// Ask before flattening a transform that sits on a landmark collection.
    /// Default: `true`
    pub confirm_harden_landmarks: bool,

    /// Let an existing midpoint be a parent of a new midpoint.
    /// Default: `false`
    pub allow_midpoint_parents: bool,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            project_on_surface_by_default: true,
            roi_array_suffix: "_ROI".to_owned(),
            harden_name_prefix: "SurfaceRegistration_".to_owned(),
            clean_weld_epsilon: 1e-9,
            confirm_reprojection: true,
            confirm_harden_landmarks: true,
            allow_midpoint_parents: false,
        }
    }
}

impl LandmarkConfig {
    /// Config for unattended use: never asks, always proceeds.
    #[must_use]
    pub fn unattended() -> Self {
        Self {
            confirm_reprojection: false,
            confirm_harden_landmarks: false,
            ..Self::default()
        }
    }

    /// Set whether landmarks are projected when first connected.
    #[must_use]
    pub const fn with_project_on_surface_by_default(mut self, project: bool) -> Self {
        self.project_on_surface_by_default = project;
        self
    }

    /// Set the ROI array suffix.
    #[must_use]
    pub fn with_roi_array_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.roi_array_suffix = suffix.into();
        self
    }

    /// Set the harden snapshot name prefix.
    #[must_use]
    pub fn with_harden_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.harden_name_prefix = prefix.into();
        self
    }

    /// Set the weld distance for cleaning.
    #[must_use]
    pub const fn with_clean_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.clean_weld_epsilon = epsilon;
        self
    }

    /// Set whether reprojection onto another model must be confirmed.
    #[must_use]
    pub const fn with_confirm_reprojection(mut self, confirm: bool) -> Self {
        self.confirm_reprojection = confirm;
        self
    }

    /// Set whether hardening a collection transform must be confirmed.
    #[must_use]
    pub const fn with_confirm_harden_landmarks(mut self, confirm: bool) -> Self {
        self.confirm_harden_landmarks = confirm;
        self
    }

    /// Set whether midpoints may be midpoint parents.
    #[must_use]
    pub const fn with_allow_midpoint_parents(mut self, allow: bool) -> Self {
        self.allow_midpoint_parents = allow;
        self
    }

    /// ROI array name for a model.
    #[must_use]
    pub fn roi_array_name(&self, model_name: &str) -> String {
        format!("{model_name}{}", self.roi_array_suffix)
    }

    /// Harden snapshot name for a model.
    #[must_use]
    pub fn harden_name(&self, model_name: &str) -> String {
        format!("{}{model_name}_hardenCopy", self.harden_name_prefix)
    }

    /// Cleaning parameters derived from this config.
    #[must_use]
    pub fn clean_params(&self) -> CleanParams {
        CleanParams::default().with_weld_epsilon(self.clean_weld_epsilon)
    }
}
