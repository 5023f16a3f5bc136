//! Flattened joint hierarchy with forward kinematics

use nou_math::{Mat4, Vec3};

use crate::joint::Joint;

/// Index-based joint hierarchy
///
/// The skeleton owns its joints in one contiguous array. The first joint
/// added is the root; every later joint must name an already-added parent,
/// so parents always precede their children in the array. Copying a
/// skeleton is a plain [`Clone`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Root joint index
    pub const ROOT: usize = 0;

    /// Create an empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint and return its index
    ///
    /// # Panics
    ///
    /// Panics if `parent` is `None` for anything but the first joint, or if
    /// `parent` names a joint that has not been added yet.
    pub fn add_joint(&mut self, mut joint: Joint, parent: Option<usize>) -> usize {
        let index = self.joints.len();
        match parent {
            None => assert!(index == Self::ROOT, "skeleton already has a root joint"),
            Some(p) => {
                assert!(p < index, "parent joint {p} does not exist yet");
                self.joints[p].children.push(index);
            }
        }
        joint.parent = parent;
        joint.children.clear();
        self.joints.push(joint);
        index
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Index of the first joint with the given name
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Put every joint back in its bind pose
    pub fn reset_to_base_pose(&mut self) {
        for joint in &mut self.joints {
            joint.reset_to_base_pose();
        }
    }

    /// Forward kinematics from the root
    ///
    /// Each joint's global matrix becomes its parent's global matrix times
    /// its own local matrix, visiting parents before children.
    pub fn compute_fk(&mut self) {
        if self.joints.is_empty() {
            return;
        }

        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY)];
        while let Some((index, parent_global)) = stack.pop() {
            let joint = &mut self.joints[index];
            joint.global = parent_global * joint.local_matrix();
            let global = joint.global;
            stack.extend(joint.children.iter().map(|c| (*c, global)));
        }
    }

    /// `global * inv_bind` for one joint, identity if out of range
    pub fn skinning_matrix(&self, index: usize) -> Mat4 {
        self.joints
            .get(index)
            .map_or(Mat4::IDENTITY, Joint::skinning_matrix)
    }

    /// World-space joint origin as of the last FK pass
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.joints
            .get(index)
            .map(|j| j.global.transform_point3(Vec3::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nou_math::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn arm() -> Skeleton {
        let mut skeleton = Skeleton::new();
        let root = skeleton.add_joint(
            Joint::new("shoulder", Vec3::ZERO, Quat::IDENTITY, Mat4::IDENTITY),
            None,
        );
        let elbow = skeleton.add_joint(
            Joint::new(
                "elbow",
                Vec3::new(1.0, 0.0, 0.0),
                Quat::IDENTITY,
                Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
            ),
            Some(root),
        );
        skeleton.add_joint(
            Joint::new(
                "wrist",
                Vec3::new(1.0, 0.0, 0.0),
                Quat::IDENTITY,
                Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0)),
            ),
            Some(elbow),
        );
        skeleton
    }

    #[test]
    fn test_add_joint_links_children() {
        let skeleton = arm();
        assert_eq!(skeleton.joint_count(), 3);
        assert_eq!(skeleton.joints()[0].children(), &[1]);
        assert_eq!(skeleton.joints()[2].parent(), Some(1));
        assert_eq!(skeleton.find_joint("wrist"), Some(2));
        assert_eq!(skeleton.find_joint("tail"), None);
    }

    #[test]
    #[should_panic(expected = "already has a root")]
    fn test_second_root_panics() {
        let mut skeleton = arm();
        skeleton.add_joint(
            Joint::new("extra", Vec3::ZERO, Quat::IDENTITY, Mat4::IDENTITY),
            None,
        );
    }

    #[test]
    #[should_panic(expected = "does not exist yet")]
    fn test_forward_parent_panics() {
        let mut skeleton = Skeleton::new();
        skeleton.add_joint(
            Joint::new("root", Vec3::ZERO, Quat::IDENTITY, Mat4::IDENTITY),
            None,
        );
        skeleton.add_joint(
            Joint::new("child", Vec3::ZERO, Quat::IDENTITY, Mat4::IDENTITY),
            Some(5),
        );
    }

    #[test]
    fn test_fk_chain() {
        let mut skeleton = arm();
        skeleton
            .joint_mut(0)
            .unwrap()
            .set_pose(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
        skeleton.compute_fk();

        let wrist = skeleton.world_position(2).unwrap();
        assert!(wrist.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn test_bind_pose_skinning_is_identity() {
        let mut skeleton = arm();
        skeleton.compute_fk();
        for i in 0..skeleton.joint_count() {
            assert!(skeleton.skinning_matrix(i).abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
        assert_eq!(skeleton.skinning_matrix(99), Mat4::IDENTITY);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = arm();
        let mut copy = original.clone();
        copy.joint_mut(1)
            .unwrap()
            .set_pose(Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY);
        copy.compute_fk();

        assert_eq!(original.joints()[1].position(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(original.joints()[1].global(), Mat4::IDENTITY);
        assert!(
            copy.world_position(2)
                .unwrap()
                .abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), 1e-6)
        );
    }

    #[test]
    fn test_reset_to_base_pose() {
        let mut skeleton = arm();
        skeleton
            .joint_mut(2)
            .unwrap()
            .set_pose(Vec3::splat(3.0), Quat::from_rotation_y(1.0));
        skeleton.reset_to_base_pose();
        assert_eq!(skeleton.joints()[2].position(), Vec3::new(1.0, 0.0, 0.0));
    }
}
