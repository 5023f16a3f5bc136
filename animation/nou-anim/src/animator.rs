//! Per-instance animation driver
//!
//! An [`Animator`] bundles what one animated character needs each frame:
//! its own copy of the skeleton, a blend tree and the skinning palette.
//! [`Animator::tick`] runs the frame in order: blend tree update, apply,
//! skeleton FK, palette refresh.

use std::sync::Arc;

use crate::blend::{BlendMode, BlendTree};
use crate::clip::ClipEvaluator;
use crate::palette::{JointPalette, SkinnedRenderer};
use crate::skeleton::Skeleton;
use crate::track::SkeletalAnim;

/// Skeleton instance driven by a blend tree
#[derive(Debug, Clone)]
pub struct Animator {
    skeleton: Skeleton,
    tree: BlendTree,
    palette: JointPalette,
}

impl Animator {
    /// Create an animator with an empty blend tree, in bind pose
    pub fn new(skeleton: Skeleton) -> Self {
        let mut animator = Self {
            skeleton,
            tree: BlendTree::new(),
            palette: JointPalette::new(),
        };
        animator.skeleton.compute_fk();
        animator.palette.refresh(&animator.skeleton);
        animator
    }

    /// Evaluator for `anim` bound to this animator's skeleton
    pub fn clip(&self, anim: Arc<SkeletalAnim>) -> ClipEvaluator {
        ClipEvaluator::new(anim, &self.skeleton)
    }

    /// Append `anim` to the back of the blend chain
    pub fn push_layer(&mut self, anim: Arc<SkeletalAnim>, mode: BlendMode, weight: f32) -> usize {
        let clip = self.clip(anim);
        self.tree.push(clip, mode, weight)
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn tree(&self) -> &BlendTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BlendTree {
        &mut self.tree
    }

    pub fn palette(&self) -> &JointPalette {
        &self.palette
    }

    /// Advance one frame by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.tree.update(dt, &self.skeleton);
        self.tree.apply(&mut self.skeleton);
        self.skeleton.compute_fk();
        self.palette.refresh(&self.skeleton);
    }

    /// Hand the current palette to a renderer
    pub fn upload<R: SkinnedRenderer + ?Sized>(&self, renderer: &mut R) {
        self.palette.upload(renderer);
    }
}
