//! Skeletal animation for the NOU framework.
//!
//! - [`Skeleton`] / [`Joint`]: index-based joint hierarchy with FK from the root
//! - [`SkeletalAnim`]: keyframe tracks, optionally stored as deltas from the
//!   bind pose ("diff clips")
//! - [`ClipEvaluator`]: looping, time-driven pose evaluation
//! - [`BlendTree`]: pass / blend / additive composition of several clips
//! - [`JointPalette`]: skinning matrices for upload to a renderer
//! - [`Animator`]: one character instance tying the above together
//! - [`loader`]: skeletons and clips from decoded skin/animation data
//!
//! A frame runs blend tree update, apply, skeleton FK, then palette refresh,
//! which is what [`Animator::tick`] does.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use nou_anim::{Animator, BlendMode, Joint, JointTrack, SkeletalAnim, Skeleton};
//! use nou_math::{Mat4, Quat, Vec3};
//!
//! let mut skeleton = Skeleton::new();
//! let root = skeleton.add_joint(Joint::new("root", Vec3::ZERO, Quat::IDENTITY, Mat4::IDENTITY), None);
//! skeleton.add_joint(
//!     Joint::new("tip", Vec3::Y, Quat::IDENTITY, Mat4::from_translation(-Vec3::Y)),
//!     Some(root),
//! );
//!
//! let raise = SkeletalAnim::new("raise").with_track(
//!     JointTrack::new(0)
//!         .with_position(0.0, Vec3::ZERO)
//!         .with_position(2.0, Vec3::new(0.0, 2.0, 0.0)),
//! );
//!
//! let mut animator = Animator::new(skeleton);
//! animator.push_layer(Arc::new(raise), BlendMode::Pass, 1.0);
//! animator.tick(1.0);
//!
//! let tip = animator.skeleton().world_position(1).unwrap();
//! assert!(tip.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
//! ```

#![forbid(unsafe_code)]

pub mod animator;
pub mod blend;
pub mod clip;
pub mod error;
pub mod joint;
pub mod loader;
pub mod palette;
pub mod pose;
pub mod skeleton;
pub mod track;

pub use animator::Animator;
pub use blend::{BlendMode, BlendNode, BlendTree, ParseBlendModeError};
pub use clip::ClipEvaluator;
pub use error::{AnimError, LoadError, Result};
pub use joint::Joint;
pub use loader::{
    AnimSource, ChannelPath, JointIndexMap, LoadWarning, LoadedClip, LoadedSkeleton,
    SkinSource, SourceChannel, SourceJoint, load_clip, load_skeleton,
};
pub use palette::{JointPalette, MAX_JOINTS, SkinnedRenderer};
pub use pose::{JointPose, Pose};
pub use skeleton::Skeleton;
pub use track::{JointTrack, Keyframe, SkeletalAnim};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
