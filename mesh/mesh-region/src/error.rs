//! Error types for mesh region operations.

use thiserror::Error;

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;

/// Errors that can occur during region operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegionError {
    /// An invalid vertex index was provided.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The mesh has no vertices to search.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A mesh with more vertices than a `u32` index can address.
    #[error("mesh has {vertex_count} vertices, more than a u32 index can address")]
    TooManyVertices {
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A vertex position holds NaN or an infinity and cannot be indexed.
    #[error("vertex {index} has a non-finite position")]
    NonFinitePosition {
        /// The offending vertex.
        index: u32,
    },
}
