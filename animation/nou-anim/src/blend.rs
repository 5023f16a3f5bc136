//! Blend tree: a chain of clip evaluators composed into one pose
//!
//! Node 0 is the front of the chain. Every node with a mode other than
//! [`BlendMode::Pass`] composes its own clip with the output of the node
//! right after it:
//!
//! - `Pass`: own pose only; diff clips are re-based on the bind pose
//! - `Blend`: `mix(rhs, own, weight)`
//! - `Additive`: own delta stacked on the rhs output
//!   (`rhs.position + own.position`, `own.rotation * rhs.rotation`), then
//!   `mix(rhs, stacked, weight)`
//!
//! [`BlendTree::apply`] writes the front node's output into a skeleton and
//! does nothing else; FK and joint-matrix refresh are up to the caller.

use std::fmt;
use std::str::FromStr;

use nou_math::Mix;

use crate::clip::ClipEvaluator;
use crate::error::{AnimError, Result};
use crate::pose::{JointPose, Pose};
use crate::skeleton::Skeleton;

/// How a blend node combines its clip with the next node's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BlendMode {
    /// Ignore the next node
    #[default]
    Pass,
    /// Linear mix between the next node's output and this node's pose
    Blend,
    /// Stack this node's delta on top of the next node's output
    Additive,
}

impl BlendMode {
    pub const ALL: [Self; 3] = [Self::Pass, Self::Blend, Self::Additive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Blend => "blend",
            Self::Additive => "additive",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized blend mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blend mode '{0}', expected one of: pass, blend, additive")]
pub struct ParseBlendModeError(String);

impl FromStr for BlendMode {
    type Err = ParseBlendModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseBlendModeError(s.to_string()))
    }
}

/// One link of a [`BlendTree`]
#[derive(Debug, Clone)]
pub struct BlendNode {
    clip: ClipEvaluator,
    mode: BlendMode,
    weight: f32,
    output: Pose,
}

impl BlendNode {
    pub fn clip(&self) -> &ClipEvaluator {
        &self.clip
    }

    pub fn clip_mut(&mut self) -> &mut ClipEvaluator {
        &mut self.clip
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Blend parameter in `[0, 1]`
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Pose computed by the last [`BlendTree::update`]
    pub fn output(&self) -> &Pose {
        &self.output
    }

    fn resolve_own(&self, base: &[JointPose], index: usize) -> JointPose {
        let own = self.clip.pose().as_slice()[index];
        if self.clip.is_diff() {
            own.rebased(&base[index])
        } else {
            own
        }
    }

    fn compose(&mut self, rhs: Option<&Pose>, base: &[JointPose]) {
        let mut count = self.output.len().min(base.len());
        if let Some(rhs) = rhs {
            count = count.min(rhs.len());
        }
        for i in 0..count {
            let own = self.resolve_own(base, i);
            let out = match (self.mode, rhs) {
                (BlendMode::Pass, _) | (_, None) => own,
                (BlendMode::Blend, Some(rhs)) => rhs.as_slice()[i].mix(&own, self.weight),
                (BlendMode::Additive, Some(rhs)) => {
                    let rhs = rhs.as_slice()[i];
                    let delta = self.clip.pose().as_slice()[i];
                    let stacked = JointPose {
                        position: rhs.position + delta.position,
                        rotation: (delta.rotation * rhs.rotation).normalize(),
                    };
                    rhs.mix(&stacked, self.weight)
                }
            };
            self.output.as_mut_slice()[i] = out;
        }
    }
}

/// Chain of blend nodes producing a final skeleton pose
#[derive(Debug, Clone, Default)]
pub struct BlendTree {
    nodes: Vec<BlendNode>,
}

impl BlendTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node to the back of the chain and return its index
    ///
    /// The node composes with whatever is pushed after it.
    pub fn push(&mut self, clip: ClipEvaluator, mode: BlendMode, weight: f32) -> usize {
        if mode == BlendMode::Additive && !clip.is_diff() {
            log::warn!(
                "Additive blend node uses absolute clip '{}'; its keyframes will be stacked as deltas",
                clip.anim().name()
            );
        }

        let output = clip.pose().clone();
        self.nodes.push(BlendNode {
            clip,
            mode,
            weight: weight.clamp(0.0, 1.0),
            output,
        });
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn nodes(&self) -> &[BlendNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&BlendNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut BlendNode> {
        self.nodes.get_mut(index)
    }

    /// Set a node's blend parameter, clamped to `[0, 1]`
    pub fn set_weight(&mut self, index: usize, weight: f32) -> Result<()> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or(AnimError::NodeOutOfRange { index, len })?;
        node.weight = weight.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_mode(&mut self, index: usize, mode: BlendMode) -> Result<()> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or(AnimError::NodeOutOfRange { index, len })?;
        node.mode = mode;
        Ok(())
    }

    /// Number of nodes reachable from the front through non-pass modes
    pub fn active_len(&self) -> usize {
        self.nodes
            .iter()
            .position(|n| n.mode == BlendMode::Pass)
            .map_or(self.nodes.len(), |i| i + 1)
    }

    /// Advance every active node's clip and recompute outputs back to front
    pub fn update(&mut self, dt: f32, skeleton: &Skeleton) {
        let active = self.active_len();
        if active == 0 {
            return;
        }

        let base = Pose::base(skeleton);
        for node in &mut self.nodes[..active] {
            node.clip.update(dt);
        }

        for i in (0..active).rev() {
            let (head, tail) = self.nodes.split_at_mut(i + 1);
            let rhs = if i + 1 < active {
                tail.first().map(|n| &n.output)
            } else {
                None
            };
            head[i].compose(rhs, base.as_slice());
        }
    }

    /// Front node's output, if the tree has any nodes
    pub fn output(&self) -> Option<&Pose> {
        self.nodes.first().map(|n| &n.output)
    }

    /// Write the front node's output into `skeleton`'s joints
    pub fn apply(&self, skeleton: &mut Skeleton) {
        if let Some(pose) = self.output() {
            pose.write_to(skeleton);
        }
    }
}
