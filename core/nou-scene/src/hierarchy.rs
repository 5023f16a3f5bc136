//! Scene hierarchy: node storage, re-parenting and the FK pass
//!
//! Nodes live in an arena of slots. A [`NodeId`] records the slot index, the
//! slot's generation when the node was created, and which hierarchy issued
//! it. Destroying a node bumps the slot generation, so any handle still
//! pointing at it fails with [`SceneError::StaleHandle`] instead of reaching
//! whatever node reuses the slot later.
//!
//! The hierarchy keeps every live node in an update order sorted (stably) by
//! depth. Since a child is always exactly one level deeper than its parent,
//! walking that order visits parents before their children, which is all the
//! forward-kinematics pass needs.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use nou_math::{Mat3, Mat4, Vec3, normal_matrix};

use crate::context::{RenderContext, SceneRenderer};
use crate::error::{Result, SceneError};
use crate::transform::Transform;

static NEXT_HIERARCHY_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a node owned by a [`Hierarchy`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
    hierarchy: u32,
}

impl NodeId {
    /// Arena slot of the node
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the node was created
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{} (gen {})", self.index, self.generation)
    }
}

/// A node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    world: Mat4,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Number of ancestors (0 for roots)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// World matrix as of the last [`Hierarchy::recompute_global`]
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owner of all transform nodes in a scene
#[derive(Debug)]
pub struct Hierarchy {
    id: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live nodes, stably sorted by depth
    order: Vec<NodeId>,
}

impl Hierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self {
            id: NEXT_HIERARCHY_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Create a root node with an identity transform
    pub fn create(&mut self, name: impl Into<String>) -> NodeId {
        self.create_with(name, Transform::new())
    }

    /// Create a root node with the given transform
    pub fn create_with(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let node = Node {
            name: name.into(),
            transform,
            parent: None,
            children: Vec::new(),
            depth: 0,
            world: Mat4::IDENTITY,
        };

        let (index, generation) = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                (index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (index, 0)
            }
        };

        let id = NodeId {
            index,
            generation,
            hierarchy: self.id,
        };
        // Roots sort ahead of every deeper node
        let at = self.order.partition_point(|n| self.depth_unchecked(*n) == 0);
        self.order.insert(at, id);
        id
    }

    /// Create a node and attach it under `parent`
    pub fn create_child(&mut self, name: impl Into<String>, parent: NodeId) -> Result<NodeId> {
        self.check(parent)?;
        let id = self.create(name);
        self.set_parent(id, Some(parent))?;
        Ok(id)
    }

    /// Destroy a node. Its children are detached and become roots.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;

        let children = self.node_unchecked(id).children.clone();
        for child in children {
            self.unlink(child);
            self.refresh_depths(child, 0);
        }
        self.unlink(id);

        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        self.order.retain(|n| *n != id);
        self.sort_order();
        log::debug!("Destroyed {id}");
        Ok(())
    }

    /// Whether `id` refers to a live node of this hierarchy
    pub fn contains(&self, id: NodeId) -> bool {
        id.hierarchy == self.id && self.check(id).is_ok()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.check(id)?;
        Ok(self.node_unchecked(id))
    }

    pub fn transform(&self, id: NodeId) -> Result<&Transform> {
        Ok(&self.node(id)?.transform)
    }

    /// Mutable access to a node's local transform
    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform> {
        self.check(id)?;
        Ok(&mut self.node_unchecked_mut(id).transform)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn depth(&self, id: NodeId) -> Result<usize> {
        Ok(self.node(id)?.depth)
    }

    /// Live nodes without a parent
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order
            .iter()
            .copied()
            .take_while(|id| self.depth_unchecked(*id) == 0)
    }

    /// Order in which the FK pass visits nodes; parents precede children
    pub fn update_order(&self) -> &[NodeId] {
        &self.order
    }

    /// First live node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.node_unchecked(*id).name == name)
    }

    /// Iterate over live nodes in update order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order.iter().map(|id| (*id, self.node_unchecked(*id)))
    }

    /// Attach `child` under `parent`, or make it a root when `parent` is `None`.
    ///
    /// Depths of `child` and its whole subtree are recomputed and the update
    /// order is re-sorted. The local transform is kept as is, so the node's
    /// world pose changes with its new parent.
    ///
    /// # Panics
    ///
    /// Panics if either handle was issued by a different hierarchy.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.check(child)?;
        if let Some(parent) = parent {
            self.check(parent)?;
            if self.is_ancestor_or_self(child, parent) {
                return Err(SceneError::Cycle { child, parent });
            }
        }

        if self.node_unchecked(child).parent == parent {
            return Ok(());
        }

        self.unlink(child);

        let depth = match parent {
            Some(parent) => {
                self.node_unchecked_mut(parent).children.push(child);
                self.node_unchecked_mut(child).parent = Some(parent);
                self.node_unchecked(parent).depth + 1
            }
            None => 0,
        };

        self.refresh_depths(child, depth);
        self.sort_order();

        log::trace!(
            "Re-parented {child} under {}",
            parent.map_or_else(|| "nothing".to_string(), |p| p.to_string())
        );
        Ok(())
    }

    /// Forward kinematics over the whole hierarchy.
    ///
    /// Visits nodes in update order and sets each world matrix to the
    /// parent's world matrix times the node's local matrix (or just the local
    /// matrix for roots). Run once per frame after transforms are edited and
    /// before anything reads world matrices.
    pub fn recompute_global(&mut self) {
        for i in 0..self.order.len() {
            let id = self.order[i];
            let parent_world = self
                .node_unchecked(id)
                .parent
                .map(|p| self.node_unchecked(p).world);

            let node = self.node_unchecked_mut(id);
            let local = node.transform.local_transform();
            node.world = match parent_world {
                Some(parent_world) => parent_world * local,
                None => local,
            };
        }
    }

    /// World matrix as of the last FK pass
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4> {
        Ok(self.node(id)?.world)
    }

    /// World-space position as of the last FK pass
    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }

    /// Inverse-transpose of the world matrix's upper 3x3
    pub fn world_normal_matrix(&self, id: NodeId) -> Result<Mat3> {
        Ok(normal_matrix(&self.world_matrix(id)?))
    }

    /// Hand every node's world matrices to `renderer`, in update order
    pub fn draw<R: SceneRenderer + ?Sized>(&self, ctx: &RenderContext, renderer: &mut R) {
        for (id, node) in self.iter() {
            renderer.draw(ctx, id, node, &node.world, &normal_matrix(&node.world));
        }
    }

    fn check(&self, id: NodeId) -> Result<()> {
        assert_eq!(
            id.hierarchy, self.id,
            "{id} was issued by a different hierarchy"
        );
        match self.slots.get(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => Ok(()),
            _ => Err(SceneError::StaleHandle(id)),
        }
    }

    // Callers must have validated `id` with `check`
    fn node_unchecked(&self, id: NodeId) -> &Node {
        match &self.slots[id.index as usize].node {
            Some(node) => node,
            None => unreachable!("{id} is not live"),
        }
    }

    fn node_unchecked_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.index as usize].node {
            Some(node) => node,
            None => unreachable!("{id} is not live"),
        }
    }

    fn depth_unchecked(&self, id: NodeId) -> usize {
        self.node_unchecked(id).depth
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node_unchecked(id).parent;
        }
        false
    }

    /// Detach `child` from its parent's child list
    fn unlink(&mut self, child: NodeId) {
        if let Some(parent) = self.node_unchecked_mut(child).parent.take() {
            self.node_unchecked_mut(parent)
                .children
                .retain(|c| *c != child);
        }
    }

    fn refresh_depths(&mut self, root: NodeId, depth: usize) {
        let mut stack = vec![(root, depth)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node_unchecked_mut(id);
            node.depth = depth;
            stack.extend(node.children.iter().map(|c| (*c, depth + 1)));
        }
    }

    fn sort_order(&mut self) {
        let mut order = std::mem::take(&mut self.order);
        order.sort_by_key(|id| self.depth_unchecked(*id));
        self.order = order;
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain() -> (Hierarchy, NodeId, NodeId, NodeId) {
        let mut scene = Hierarchy::new();
        let root = scene.create("root");
        let a = scene.create_child("a", root).unwrap();
        let b = scene.create_child("b", a).unwrap();
        (scene, root, a, b)
    }

    #[test]
    fn test_create_root() {
        let mut scene = Hierarchy::new();
        let root = scene.create("root");
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.depth(root).unwrap(), 0);
        assert_eq!(scene.parent(root).unwrap(), None);
        assert_eq!(scene.roots().collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn test_simple_chain_world_position() {
        let (mut scene, _root, a, b) = chain();
        scene
            .transform_mut(a)
            .unwrap()
            .set_local_position(Vec3::new(1.0, 0.0, 0.0));
        scene
            .transform_mut(b)
            .unwrap()
            .set_local_position(Vec3::new(0.0, 1.0, 0.0));

        scene.recompute_global();

        let p = scene.world_position(b).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_reparent_updates_depth() {
        let (mut scene, root, a, b) = chain();
        assert_eq!(scene.depth(b).unwrap(), 2);

        scene.set_parent(b, Some(root)).unwrap();

        assert_eq!(scene.depth(b).unwrap(), 1);
        assert_eq!(scene.depth(a).unwrap(), 1);
        assert_eq!(scene.children(a).unwrap(), &[] as &[NodeId]);
        assert_eq!(scene.children(root).unwrap(), &[a, b]);
    }

    #[test]
    fn test_reparent_moves_subtree_depths() {
        let (mut scene, root, a, b) = chain();
        let c = scene.create("c");
        scene.set_parent(a, Some(c)).unwrap();
        scene.set_parent(c, Some(root)).unwrap();

        assert_eq!(scene.depth(c).unwrap(), 1);
        assert_eq!(scene.depth(a).unwrap(), 2);
        assert_eq!(scene.depth(b).unwrap(), 3);
    }

    #[test]
    fn test_update_order_parents_first() {
        let mut scene = Hierarchy::new();
        let leaf = scene.create("leaf");
        let mid = scene.create("mid");
        let top = scene.create("top");
        scene.set_parent(leaf, Some(mid)).unwrap();
        scene.set_parent(mid, Some(top)).unwrap();

        assert_eq!(scene.update_order(), &[top, mid, leaf]);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut scene, root, _a, b) = chain();
        assert_eq!(
            scene.set_parent(root, Some(b)),
            Err(SceneError::Cycle {
                child: root,
                parent: b
            })
        );
        assert!(matches!(
            scene.set_parent(b, Some(b)),
            Err(SceneError::Cycle { .. })
        ));
    }

    #[test]
    fn test_destroy_orphans_children() {
        let (mut scene, root, a, b) = chain();
        scene.destroy(a).unwrap();

        assert!(!scene.contains(a));
        assert_eq!(scene.parent(b).unwrap(), None);
        assert_eq!(scene.depth(b).unwrap(), 0);
        assert_eq!(scene.children(root).unwrap(), &[] as &[NodeId]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut scene = Hierarchy::new();
        let old = scene.create("old");
        scene.destroy(old).unwrap();
        let new = scene.create("new");

        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert_eq!(scene.node(old).err(), Some(SceneError::StaleHandle(old)));
        assert_eq!(scene.node(new).unwrap().name(), "new");
    }

    #[test]
    #[should_panic(expected = "different hierarchy")]
    fn test_cross_hierarchy_parenting_panics() {
        let mut first = Hierarchy::new();
        let mut second = Hierarchy::new();
        let a = first.create("a");
        let b = second.create("b");
        let _ = first.set_parent(a, Some(b));
    }

    #[test]
    fn test_fk_idempotent() {
        let (mut scene, root, a, b) = chain();
        scene
            .transform_mut(root)
            .unwrap()
            .rotate_local(Vec3::new(10.0, 20.0, 30.0));
        scene
            .transform_mut(a)
            .unwrap()
            .set_local_scale(Vec3::new(1.0, 2.0, 3.0));
        scene
            .transform_mut(b)
            .unwrap()
            .set_local_position(Vec3::new(0.3, 0.1, -2.0));

        scene.recompute_global();
        let first: Vec<Mat4> = scene.iter().map(|(_, n)| n.world_matrix()).collect();
        scene.recompute_global();
        let second: Vec<Mat4> = scene.iter().map(|(_, n)| n.world_matrix()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_by_name() {
        let (scene, _root, a, _b) = chain();
        assert_eq!(scene.find_by_name("a"), Some(a));
        assert_eq!(scene.find_by_name("missing"), None);
    }
}
