//! Per-frame camera state handed to renderers

use nou_math::{Mat3, Mat4};

use crate::hierarchy::{Node, NodeId};

/// Camera matrices for the frame being drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub view: Mat4,
    pub projection: Mat4,
}

impl RenderContext {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Clip-space matrix for an object with the given world matrix
    pub fn model_view_projection(&self, world: &Mat4) -> Mat4 {
        self.view_projection() * *world
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Receives each node's world and normal matrices during [`Hierarchy::draw`]
///
/// [`Hierarchy::draw`]: crate::Hierarchy::draw
pub trait SceneRenderer {
    fn draw(&mut self, ctx: &RenderContext, id: NodeId, node: &Node, world: &Mat4, normal: &Mat3);
}
