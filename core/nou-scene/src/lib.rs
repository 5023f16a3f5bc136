//! Scene-graph transforms for the NOU framework.
//!
//! A [`Hierarchy`] owns every [`Transform`] in a scene and hands out
//! generation-checked [`NodeId`] handles. Nodes can be re-parented freely;
//! the hierarchy keeps each node's depth and a parent-before-child update
//! order, and [`Hierarchy::recompute_global`] runs the forward-kinematics
//! pass that fills in world matrices.
//!
//! # Example
//!
//! ```
//! use nou_scene::Hierarchy;
//! use nou_math::Vec3;
//!
//! let mut scene = Hierarchy::new();
//! let root = scene.create("root");
//! let arm = scene.create_child("arm", root)?;
//! let hand = scene.create_child("hand", arm)?;
//!
//! scene.transform_mut(arm)?.set_local_position(Vec3::new(1.0, 0.0, 0.0));
//! scene.transform_mut(hand)?.set_local_position(Vec3::new(0.0, 1.0, 0.0));
//!
//! scene.recompute_global();
//! let p = scene.world_position(hand)?;
//! assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
//! # Ok::<(), nou_scene::SceneError>(())
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod hierarchy;
pub mod transform;

pub use context::{RenderContext, SceneRenderer};
pub use error::{Result, SceneError};
pub use hierarchy::{Hierarchy, Node, NodeId};
pub use transform::Transform;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
