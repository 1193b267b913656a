//! Vertex neighborhoods and ROI arrays for triangle meshes.
//!
//! This crate holds the graph side of landmark-driven regions of interest:
//! which vertex a point lands on, which vertices lie within a number of
//! edge hops of it, and how such a set is shown on the surface as a scalar
//! array.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero UI or host dependencies**. The
//! caller owns the meshes and decides when to rebuild the structures below.
//!
//! # Overview
//!
//! - [`VertexAdjacency`] - one-ring neighbors of every vertex
//! - [`PointLocator`] - KD-tree nearest-vertex lookup
//! - [`expand_neighborhood`] - every vertex within `k` hops of a seed
//! - [`MeshRegion`] - a named vertex set (the ROI)
//! - [`attach_roi_array`] - a region as a `1.0`/`0.0` per-vertex array on a mesh
//! - [`clean_mesh`] - weld and compact a mesh before indexing it
//!
//! # Quick Start
//!
//! ```
//! use mesh_region::{
//!     MeshRegion, PointLocator, VertexAdjacency, attach_roi_array, expand_neighborhood,
//!     fixtures::uv_sphere,
//! };
//!
//! let mut sphere = uv_sphere(100.0, 8, 8);
//! let locator = PointLocator::build(&sphere).unwrap();
//! let adjacency = VertexAdjacency::from_mesh(&sphere);
//!
//! let seed = locator.closest_vertex(&sphere.vertices[9].position);
//! let ring = expand_neighborhood(&adjacency, seed, 1).unwrap();
//!
//! let region = MeshRegion::from_vertices("sphere_ROI", ring);
//! let array = attach_roi_array(&mut sphere, &region);
//! assert_eq!(array.nonzero_indices().count(), 7);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod adjacency;
mod clean;
mod error;
pub mod fixtures;
mod locator;
mod neighborhood;
mod region;
mod roi;

pub use adjacency::VertexAdjacency;
pub use clean::{CleanParams, CleanSummary, clean_mesh};
pub use error::{RegionError, RegionResult};
pub use locator::{ClosestVertex, PointLocator};
pub use neighborhood::{expand_neighborhood, expand_neighborhoods};
pub use region::MeshRegion;
pub use roi::{attach_roi_array, build_roi_array};

// Re-export for convenience
pub use mesh_types::{IndexedMesh, Point3, ScalarArray, Vertex};
