//! Euler-angle conversions in degrees
//!
//! Angles are `(pitch, yaw, roll)` about `(X, Y, Z)` and compose as
//! `Rz * Ry * Rx`, i.e. X is applied first. This matches the convention of
//! `glm::quat(glm::radians(euler))` that inspector widgets are usually
//! written against.

use glam::{EulerRot, Quat, Vec3};

/// Build a rotation from Euler angles given in degrees
pub fn quat_from_euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        degrees.z.to_radians(),
        degrees.y.to_radians(),
        degrees.x.to_radians(),
    )
}

/// Recover Euler angles in degrees from a rotation
///
/// The result is one of the equivalent angle triples; feeding it back to
/// [`quat_from_euler_degrees`] yields the same orientation.
pub fn euler_degrees_from_quat(rotation: Quat) -> Vec3 {
    let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_axis_matches_glam() {
        let q = quat_from_euler_degrees(Vec3::new(90.0, 0.0, 0.0));
        assert!(q.abs_diff_eq(Quat::from_rotation_x(90f32.to_radians()), 1e-6));

        let q = quat_from_euler_degrees(Vec3::new(0.0, 45.0, 0.0));
        assert!(q.abs_diff_eq(Quat::from_rotation_y(45f32.to_radians()), 1e-6));
    }

    #[test]
    fn test_x_applied_before_z() {
        let q = quat_from_euler_degrees(Vec3::new(30.0, 0.0, 60.0));
        let expected =
            Quat::from_rotation_z(60f32.to_radians()) * Quat::from_rotation_x(30f32.to_radians());
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_round_trip_orientation() {
        let degrees = Vec3::new(10.0, -35.0, 120.0);
        let q = quat_from_euler_degrees(degrees);
        let back = quat_from_euler_degrees(euler_degrees_from_quat(q));

        // q and -q encode the same orientation
        assert!(q.dot(back).abs() > 0.99999);
    }
}
