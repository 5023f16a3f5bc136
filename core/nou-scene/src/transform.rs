//! Local position/rotation/scale of a single scene node
//!
//! The local matrix is cached and only rebuilt when one of the components
//! changed since the last read. Setters return `&mut Self` so edits chain:
//!
//! ```
//! use nou_scene::Transform;
//! use nou_math::Vec3;
//!
//! let mut t = Transform::new();
//! t.set_local_position(Vec3::new(0.0, 2.0, 0.0))
//!     .set_local_scale(Vec3::splat(0.5))
//!     .rotate_local(Vec3::new(0.0, 90.0, 0.0));
//! assert!(t.is_dirty());
//! ```

use nou_math::{
    Mat3, Mat4, Quat, Trs, Vec3, euler_degrees_from_quat, normal_matrix,
    quat_from_euler_degrees,
};

/// Position, rotation and scale relative to the parent node
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    /// Euler angles (degrees) mirroring `rotation`, for inspection only
    euler_degrees: Vec3,
    local: Mat4,
    normal: Mat3,
    dirty: bool,
}

impl Transform {
    /// Identity transform
    pub fn new() -> Self {
        Self::from_trs(Trs::IDENTITY)
    }

    /// Transform starting from the given components
    pub fn from_trs(trs: Trs) -> Self {
        Self {
            position: trs.translation,
            rotation: unit_rotation(trs.rotation),
            scale: trs.scale,
            euler_degrees: euler_degrees_from_quat(unit_rotation(trs.rotation)),
            local: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
            dirty: true,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Rotation as Euler angles in degrees
    pub fn euler_degrees(&self) -> Vec3 {
        self.euler_degrees
    }

    /// Current components as a [`Trs`]
    pub fn trs(&self) -> Trs {
        Trs::new(self.position, self.rotation, self.scale)
    }

    /// Whether the cached matrices are stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_local_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self.dirty = true;
        self
    }

    /// Replace the rotation, normalizing it first
    ///
    /// A zero or non-finite quaternion is treated as identity.
    pub fn set_local_rotation(&mut self, rotation: Quat) -> &mut Self {
        let rotation = unit_rotation(rotation);
        self.rotation = rotation;
        self.euler_degrees = euler_degrees_from_quat(rotation);
        self.dirty = true;
        self
    }

    /// Replace the rotation with one built from Euler angles in degrees
    pub fn set_local_euler_degrees(&mut self, degrees: Vec3) -> &mut Self {
        self.rotation = quat_from_euler_degrees(degrees);
        self.euler_degrees = degrees;
        self.dirty = true;
        self
    }

    pub fn set_local_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self.dirty = true;
        self
    }

    /// Move along the node's own axes
    pub fn move_local(&mut self, delta: Vec3) -> &mut Self {
        self.position += self.rotation * delta;
        self.dirty = true;
        self
    }

    /// Move along the parent's axes
    pub fn move_local_fixed(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self.dirty = true;
        self
    }

    /// Rotate about the node's own axes (`rotation * delta`)
    pub fn rotate_local(&mut self, euler_delta: Vec3) -> &mut Self {
        let delta = quat_from_euler_degrees(euler_delta);
        self.set_local_rotation((self.rotation * delta).normalize())
    }

    /// Rotate about the parent's axes (`delta * rotation`)
    pub fn rotate_local_fixed(&mut self, euler_delta: Vec3) -> &mut Self {
        let delta = quat_from_euler_degrees(euler_delta);
        self.set_local_rotation((delta * self.rotation).normalize())
    }

    /// Local matrix `Translate * Rotate * Scale`, rebuilt first if stale
    pub fn local_transform(&mut self) -> Mat4 {
        self.refresh();
        self.local
    }

    /// Inverse-transpose of the local matrix's upper 3x3, rebuilt first if stale
    pub fn normal_matrix(&mut self) -> Mat3 {
        self.refresh();
        self.normal
    }

    /// Local matrix computed from the current components, bypassing the cache
    pub fn compute_local(&self) -> Mat4 {
        self.trs().to_matrix()
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.local = self.compute_local();
            self.normal = normal_matrix(&self.local);
            self.dirty = false;
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Trs> for Transform {
    fn from(trs: Trs) -> Self {
        Self::from_trs(trs)
    }
}

fn unit_rotation(rotation: Quat) -> Quat {
    let length = rotation.length();
    if length.is_finite() && length > f32::EPSILON {
        rotation / length
    } else {
        Quat::IDENTITY
    }
}
