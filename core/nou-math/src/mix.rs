//! Interpolation between values of the same type

use glam::{Quat, Vec3};

/// Types that can be interpolated between two values.
///
/// Implementations return `self` exactly when `t <= 0` and `other` exactly
/// when `t >= 1`, so sampling a keyframe boundary never drifts by an ULP.
pub trait Mix: Copy {
    /// Interpolate from `self` towards `other` by `t`
    fn mix(&self, other: &Self, t: f32) -> Self;
}

impl Mix for f32 {
    fn mix(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *other
        } else {
            self + (other - self) * t
        }
    }
}

impl Mix for Vec3 {
    fn mix(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *other
        } else {
            self.lerp(*other, t)
        }
    }
}

impl Mix for Quat {
    /// Spherical interpolation along the shorter arc.
    fn mix(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *other
        } else {
            self.normalize().slerp(other.normalize(), t)
        }
    }
}
