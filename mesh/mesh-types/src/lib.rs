//! Core mesh types for longitudinal landmark work.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`Vertex`] - A point in 3D space
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices and named per-vertex arrays
//! - [`ScalarArray`] / [`PointData`] - Named per-vertex scalar fields (ROI masks and the like)
//! - [`MeshTopology`] - The minimal read interface algorithms are written against
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero UI or host dependencies**. The host
//! application owns meshes; the algorithms in this workspace only read
//! geometry and write scalar arrays back.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, MeshTopology, ScalarArray, Vertex};
//!
//! let mut mesh = IndexedMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! mesh.point_data.insert(ScalarArray::new("mask", vec![1.0, 0.0, 0.0]));
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(mesh.point_data.contains("mask"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod mesh;
mod point_data;
mod traits;
mod vertex;

pub use mesh::IndexedMesh;
pub use point_data::{PointData, ScalarArray};
pub use traits::MeshTopology;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
