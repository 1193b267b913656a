//! Surface points.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point of a surface.
///
/// Only the position is stored here. Per-vertex values that the host wants
/// to display (ROI masks, distances) live in the mesh's
/// [`PointData`](crate::PointData) so they can be replaced by name.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3};
///
/// let pole = Vertex::new(Point3::new(0.0, 0.0, 100.0));
/// assert_eq!(pole, Vertex::from_coords(0.0, 0.0, 100.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in the model's own frame (world frame once hardened).
    pub position: Point3<f64>,
}

impl Vertex {
    /// Point at `position`.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Point at `(x, y, z)`.
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Position as a plain coordinate array.
    #[inline]
    #[must_use]
    pub fn coords(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

impl From<[f64; 3]> for Vertex {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::from_coords(x, y, z)
    }
}
