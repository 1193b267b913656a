//! Mesh transformation and transform hardening.
//!
//! A host scene may place a model or a landmark collection under a
//! transform without touching the underlying coordinates. Before doing any
//! vertex-index bookkeeping the transform has to be *hardened*: applied to a
//! deep copy so that positions are in world space and indices stay stable.
//!
//! This crate provides:
//! - [`Transform3D`] - 4x4 homogeneous transform, as a host matrix or built directly
//! - [`harden_mesh`] - transform-flattened deep copy of a mesh
//! - [`harden_points`] - the same for a bare point list
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero UI or host dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_transform::{Transform3D, harden_mesh};
//! use mesh_types::{IndexedMesh, Vertex};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Vertex::from_coords(0.0, 0.0, 0.0),
//!         Vertex::from_coords(1.0, 0.0, 0.0),
//!         Vertex::from_coords(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! let hardened = harden_mesh(&mesh, Some(&Transform3D::translation(1.0, 2.0, 3.0)));
//! assert_eq!(hardened.vertices[0].position.z, 3.0);
//! assert_eq!(mesh.vertices[0].position.z, 0.0);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod harden;
mod transform;

pub use harden::{harden_mesh, harden_points};
pub use transform::Transform3D;
