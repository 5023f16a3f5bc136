//! Translate / rotate / scale composition

use glam::{Mat3, Mat4, Quat, Vec3};

/// A decomposed affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trs {
    /// Translation
    pub translation: Vec3,
    /// Rotation
    pub rotation: Quat,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Trs {
    /// The identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform from its parts
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose the matrix `Translate * Rotate * Scale`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix without shear
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for Trs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Inverse-transpose of the upper 3x3 of `matrix`.
///
/// Used to carry normals through non-uniform scale. A singular matrix (a zero
/// scale axis) has no inverse; its upper 3x3 is returned unchanged instead.
pub fn normal_matrix(matrix: &Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(*matrix);
    if upper.determinant().abs() <= f32::EPSILON {
        return upper;
    }
    upper.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trs_order() {
        let trs = Trs::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let m = trs.to_matrix();

        // Scale first, then rotate +X onto +Y, then translate
        let p = m.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 4.0, 3.0), 1e-5));
    }

    #[test]
    fn test_origin_maps_to_translation() {
        let trs = Trs::new(
            Vec3::new(-4.0, 0.5, 9.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(3.0, 1.0, 0.5),
        );
        let p = trs.to_matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(trs.translation, 1e-6));
    }

    #[test]
    fn test_decompose_round_trip() {
        let trs = Trs::new(
            Vec3::new(5.0, -1.0, 2.0),
            Quat::from_rotation_x(0.4),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let back = Trs::from_matrix(&trs.to_matrix());
        assert!(back.translation.abs_diff_eq(trs.translation, 1e-5));
        assert!(back.scale.abs_diff_eq(trs.scale, 1e-5));
        assert!(back.rotation.dot(trs.rotation).abs() > 0.99999);
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&m);
        assert!(n.x_axis.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
        assert!(n.y_axis.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_normal_matrix_singular_falls_back() {
        let m = Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(normal_matrix(&m), Mat3::from_mat4(m));
    }
}
