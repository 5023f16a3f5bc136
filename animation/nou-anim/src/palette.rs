//! Skinning matrix palette handed to renderers

use nou_math::Mat4;

use crate::skeleton::Skeleton;

/// Largest joint count a skinning shader accepts
pub const MAX_JOINTS: usize = 64;

/// Receives the skinning matrix palette after each FK pass
pub trait SkinnedRenderer {
    /// Upload `matrices` (one per joint, at most [`MAX_JOINTS`])
    fn update_joint_matrices(&mut self, matrices: &[Mat4]);
}

/// Per-joint `global * inv_bind` matrices, capped at [`MAX_JOINTS`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointPalette {
    matrices: Vec<Mat4>,
}

impl JointPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the palette from a skeleton that has already run FK
    ///
    /// Joints past [`MAX_JOINTS`] are dropped.
    pub fn refresh(&mut self, skeleton: &Skeleton) {
        let count = skeleton.joint_count();
        if count > MAX_JOINTS {
            log::warn!(
                "Skeleton has {count} joints, only the first {MAX_JOINTS} are uploaded for skinning"
            );
        }

        self.matrices.clear();
        self.matrices.extend(
            skeleton
                .joints()
                .iter()
                .take(MAX_JOINTS)
                .map(crate::Joint::skinning_matrix),
        );
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Hand the palette to a renderer
    pub fn upload<R: SkinnedRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.update_joint_matrices(&self.matrices);
    }
}
