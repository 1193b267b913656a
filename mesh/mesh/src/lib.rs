//! Landmark-driven regions of interest on surface meshes.
//!
//! This umbrella crate re-exports the mesh-* crates of the workspace,
//! providing one API for pinning landmarks to surface models, growing
//! regions of interest around them, and carrying those regions across
//! scans of the same anatomy. All crates are Layer 0 (zero UI or host
//! dependencies).
//!
//! # Quick Start
//!
//! ```
//! use mesh::prelude::*;
//! use mesh::region::fixtures::uv_sphere;
//!
//! let mut logic = LandmarkLogic::new(LandmarkConfig::unattended());
//! let mut baseline = SurfaceModel::new("scan0", "scan0", uv_sphere(100.0, 8, 8));
//! let mut follow_up = SurfaceModel::new("scan1", "scan1", uv_sphere(100.0, 12, 10));
//! let mut points = LandmarkCollection::new("F", "F");
//!
//! let snapshot = logic.model_changed(&mut baseline);
//! logic.connect(&mut points, &mut baseline, &snapshot, &mut AutoConfirm(true)).unwrap();
//!
//! let id = points.add(Point3::new(0.0, 0.0, 100.0));
//! logic.landmark_added(&mut points, &id, &snapshot, &mut baseline).unwrap();
//! logic.set_roi_radius(&mut points, &id, 1.0, &snapshot, &mut baseline).unwrap();
//!
//! let reports = Propagator::default()
//!     .propagate(&mut baseline, &mut points, [&mut follow_up], PropagationMode::NonCorrespondent)
//!     .unwrap();
//! assert_eq!(reports[0].roi_vertex_count, 13);
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - `IndexedMesh`, `Vertex`, named per-vertex scalar arrays
//! - [`transform`] - `Transform3D` and transform hardening
//!
//! ## Regions
//! - [`region`] - Vertex adjacency, nearest-vertex lookup, k-ring
//!   neighborhoods, ROI arrays, mesh cleaning
//!
//! ## Landmarks
//! - [`landmarks`] - Landmark descriptions, event handling, propagation
//!
//! # Feature Flags
//!
//! - `serde` - Serialize meshes and transforms

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `Vertex`, `ScalarArray`.
pub use mesh_types as types;

/// Transforms and hardening.
pub use mesh_transform as transform;

/// Adjacency, point location, neighborhoods and ROI arrays.
pub use mesh_region as region;

/// Landmark descriptions, event handlers and ROI propagation.
pub use mesh_landmarks as landmarks;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for landmark work.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{IndexedMesh, MeshTopology, Point3, ScalarArray, Vertex};

    // Transform
    pub use mesh_transform::Transform3D;

    // Regions
    pub use mesh_region::{MeshRegion, PointLocator, VertexAdjacency, expand_neighborhood};

    // Landmarks (main use case)
    pub use mesh_landmarks::{
        AutoConfirm, ConfirmPrompt, HardenedMesh, LandmarkCollection, LandmarkConfig,
        LandmarkError, LandmarkId, LandmarkLogic, PropagationMode, Propagator, SurfaceModel,
    };
}

// =============================================================================
// Tests
// =============================================================================
