//! Per-joint local poses produced by clips and blend nodes

use nou_math::{Mix, Quat, Vec3};

use crate::skeleton::Skeleton;

/// Local position and rotation of one joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl JointPose {
    /// Zero translation, identity rotation
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Apply this pose as a delta on top of `base`
    pub fn rebased(&self, base: &Self) -> Self {
        Self {
            position: base.position + self.position,
            rotation: (self.rotation * base.rotation).normalize(),
        }
    }
}

impl Default for JointPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mix for JointPose {
    fn mix(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.mix(&other.position, t),
            rotation: self.rotation.mix(&other.rotation, t),
        }
    }
}

/// One [`JointPose`] per skeleton joint, indexed like the skeleton
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    joints: Vec<JointPose>,
}

impl Pose {
    /// `count` identity joint poses
    pub fn identity(count: usize) -> Self {
        Self {
            joints: vec![JointPose::IDENTITY; count],
        }
    }

    /// The skeleton's bind pose
    pub fn base(skeleton: &Skeleton) -> Self {
        Self {
            joints: skeleton
                .joints()
                .iter()
                .map(|j| JointPose::new(j.base_position(), j.base_rotation()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JointPose> {
        self.joints.get(index)
    }

    pub fn as_slice(&self) -> &[JointPose] {
        &self.joints
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [JointPose] {
        &mut self.joints
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointPose> {
        self.joints.iter()
    }

    /// Write every joint pose into the matching skeleton joint
    pub fn write_to(&self, skeleton: &mut Skeleton) {
        for (index, pose) in self.joints.iter().enumerate() {
            if let Some(joint) = skeleton.joint_mut(index) {
                joint.set_pose(pose.position, pose.rotation);
            }
        }
    }
}
