//! A single joint record inside a [`Skeleton`](crate::Skeleton)

use nou_math::{Mat4, Quat, Vec3};

/// Joint of a skeleton
///
/// Joints refer to each other by index into the owning skeleton's joint
/// array; a joint never points back at its skeleton. The current pose is
/// written by the blend tree, and `global` is filled in by the skeleton's
/// FK pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub(crate) name: String,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    /// Bind pose, relative to the parent
    base_position: Vec3,
    base_rotation: Quat,
    /// Current pose, relative to the parent
    position: Vec3,
    rotation: Quat,
    pub(crate) global: Mat4,
    inv_bind: Mat4,
}

impl Joint {
    /// Create a joint in its bind pose
    ///
    /// # Arguments
    /// * `name` - Joint name, used for lookups
    /// * `base_position` - Bind-pose translation relative to the parent
    /// * `base_rotation` - Bind-pose rotation relative to the parent
    /// * `inv_bind` - Inverse of the joint's world matrix in bind pose
    pub fn new(
        name: impl Into<String>,
        base_position: Vec3,
        base_rotation: Quat,
        inv_bind: Mat4,
    ) -> Self {
        let base_rotation = base_rotation.normalize();
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            base_position,
            base_rotation,
            position: base_position,
            rotation: base_rotation,
            global: Mat4::IDENTITY,
            inv_bind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent joint index, `None` for the root
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    pub fn base_rotation(&self) -> Quat {
        self.base_rotation
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Replace the current local pose
    pub fn set_pose(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    /// Return to the bind pose
    pub fn reset_to_base_pose(&mut self) {
        self.position = self.base_position;
        self.rotation = self.base_rotation;
    }

    /// Local matrix `Translate * Rotate` of the current pose
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World matrix as of the last FK pass
    pub fn global(&self) -> Mat4 {
        self.global
    }

    pub fn inv_bind(&self) -> Mat4 {
        self.inv_bind
    }

    /// Matrix that deforms bind-pose vertices into the current pose
    pub fn skinning_matrix(&self) -> Mat4 {
        self.global * self.inv_bind
    }
}
