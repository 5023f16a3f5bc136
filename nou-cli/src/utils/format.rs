//! Formatting utilities

use nou_math::{Quat, Vec3, euler_degrees_from_quat};

/// Format a vector with fixed precision, e.g. `(1.000, 0.000, -2.500)`
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", clean(v.x), clean(v.y), clean(v.z))
}

/// Format a rotation as Euler angles in degrees
pub fn format_rotation(q: Quat) -> String {
    let e = euler_degrees_from_quat(q);
    format!("({:.1}°, {:.1}°, {:.1}°)", clean(e.x), clean(e.y), clean(e.z))
}

/// Format a duration in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}

/// Round to 5 decimals so `-0.0000001` prints as `0.000`
pub fn clean(value: f32) -> f32 {
    let rounded = (value * 1e5).round() / 1e5;
    if rounded == 0.0 { 0.0 } else { rounded }
}
