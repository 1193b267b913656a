//! Homogeneous transforms as a host scene attaches them.

use nalgebra::{Matrix4, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 4x4 homogeneous transform sitting above a model or a landmark
/// collection.
///
/// The host never rewrites coordinates when the user drags a transform; it
/// only changes this matrix. [`harden_mesh`](crate::harden_mesh) and
/// [`harden_points`](crate::harden_points) bake it in.
///
/// # Example
///
/// ```
/// use mesh_transform::Transform3D;
/// use mesh_types::Point3;
///
/// let lift = Transform3D::translation(0.0, 0.0, 5.0);
/// assert_eq!(lift.transform_point(&Point3::origin()), Point3::new(0.0, 0.0, 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform3D {
    matrix: Matrix4<f64>,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Wrap an existing matrix.
    #[must_use]
    pub const fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from the sixteen elements a host exports row by row.
    #[must_use]
    pub fn from_row_major(elements: [f64; 16]) -> Self {
        Self::from_matrix(Matrix4::from_row_slice(&elements))
    }

    /// No-op transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_matrix(Matrix4::identity())
    }

    /// Shift by `(tx, ty, tz)`.
    #[must_use]
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self::from_matrix(Matrix4::new_translation(&Vector3::new(tx, ty, tz)))
    }

    /// Scale about the origin. A factor of zero is singular.
    #[must_use]
    pub fn uniform_scale(factor: f64) -> Self {
        Self::from_matrix(Matrix4::new_scaling(factor))
    }

    /// Rotate `angle` radians about the z axis.
    #[must_use]
    pub fn rotation_z(angle: f64) -> Self {
        Self::from_matrix(Matrix4::from_axis_angle(&Vector3::z_axis(), angle))
    }

    /// The underlying matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// True when hardening would leave every point in place.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.matrix.relative_eq(&Matrix4::identity(), 1e-12, 1e-12)
    }

    /// Inverse, or `None` for a singular matrix.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }

    /// Map `point` through the transform, translation included.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_and_default_agree() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform3D::identity().transform_point(&p), p);
        assert!(Transform3D::default().is_identity());
    }

    #[test]
    fn row_major_elements_put_translation_in_last_column() {
        #[rustfmt::skip]
        let t = Transform3D::from_row_major([
            1.0, 0.0, 0.0, 10.0,
            0.0, 1.0, 0.0, 20.0,
            0.0, 0.0, 1.0, 30.0,
            0.0, 0.0, 0.0, 1.0,
        ]);
        assert_eq!(t, Transform3D::translation(10.0, 20.0, 30.0));
        assert!(!t.is_identity());
    }

    #[test]
    fn quarter_turn_about_z() {
        let result = Transform3D::rotation_z(FRAC_PI_2).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = Transform3D::from_matrix(
            Transform3D::rotation_z(0.7).matrix() * Transform3D::translation(1.0, -2.0, 3.0).matrix(),
        );
        let p = Point3::new(4.0, 5.0, 6.0);
        let back = t.inverse().unwrap().transform_point(&t.transform_point(&p));
        assert_relative_eq!(back, p, epsilon = 1e-10);

        assert!(Transform3D::uniform_scale(0.0).inverse().is_none());
    }
}
