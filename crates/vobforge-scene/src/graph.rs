//! Arena scene graph: nodes live in a vector and refer to each other by index

use crate::component::Component;
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vobforge_core::{ForgeError, Result, Transform};

/// Index of a node within its `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    #[serde(default)]
    children: Vec<NodeId>,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A forest of named transform nodes.
///
/// Parent links exist for path and world-transform queries; ownership is the
/// arena itself, so there are no reference cycles to manage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            transform,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        });
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Panics if `id` does not belong to this graph
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    /// Panics if `id` does not belong to this graph
    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| NodeId(i))
    }

    pub fn add_component(&mut self, id: NodeId, component: Component) {
        self.node_mut(id).components.push(component);
    }

    pub fn components(&self, id: NodeId) -> &[Component] {
        &self.node(id).components
    }

    /// True when `ancestor` is `id` or lies on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    /// Re-parent `child` keeping its local transform
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        if !self.contains(child) || !self.contains(parent) {
            return Err(ForgeError::SceneError(format!(
                "Node {} or {} is not part of this graph",
                child.0, parent.0
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(ForgeError::SceneError(format!(
                "Cannot parent '{}' under its own descendant '{}'",
                self.node(child).name,
                self.node(parent).name
            )));
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Re-parent `child` so that its world transform is unchanged
    pub fn attach_preserving_world(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        let world = self.world_matrix(child);
        self.set_parent(child, parent)?;
        let local = self.world_matrix(parent).inverse() * world;
        self.nodes[child.0].transform = Transform::from_matrix(local);
        Ok(())
    }

    /// Make `id` a root again, keeping its local transform
    pub fn detach(&mut self, id: NodeId) {
        if let Some(old) = self.nodes[id.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != id);
        }
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = self.node(id);
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Slash-separated names from just below `ancestor` down to `id`.
    ///
    /// Returns an empty string for the ancestor itself and `None` when `id`
    /// is not in the ancestor's subtree.
    pub fn path(&self, id: NodeId, ancestor: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = id;
        while current != ancestor {
            names.push(self.node(current).name.as_str());
            current = self.node(current).parent?;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Pre-order walk of the subtree under `root`
    pub fn depth_first(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// Copy the subtree under `root` of `source` into this graph.
    ///
    /// Node references held by components are remapped to the copies. The
    /// copied root is returned as a new root of this graph.
    pub fn copy_subtree(&mut self, source: &SceneGraph, root: NodeId) -> NodeId {
        let order = source.depth_first(root);
        let mut remap = HashMap::with_capacity(order.len());

        for old in &order {
            let node = source.node(*old);
            let new = self.add_node(node.name.clone(), node.transform);
            remap.insert(*old, new);
        }

        for old in &order {
            let new = remap[old];
            let node = source.node(*old);
            if *old != root {
                if let Some(parent) = node.parent.and_then(|p| remap.get(&p)) {
                    self.nodes[new.0].parent = Some(*parent);
                    self.nodes[parent.0].children.push(new);
                }
            }
            let mut components = node.components.clone();
            for component in &mut components {
                component.remap_nodes(|id| remap.get(&id).copied());
            }
            self.nodes[new.0].components = components;
        }

        remap[&root]
    }

    /// Drop every node with an index of `len` or more, along with any child
    /// and bone references to them
    pub fn truncate(&mut self, len: usize) {
        if len >= self.nodes.len() {
            return;
        }
        self.nodes.truncate(len);
        for node in &mut self.nodes {
            node.children.retain(|c| c.0 < len);
            for component in &mut node.components {
                component.remap_nodes(|id| (id.0 < len).then_some(id));
            }
        }
    }

    /// First node in the subtree under `root` with the given name
    pub fn find(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.depth_first(root)
            .into_iter()
            .find(|id| self.node(*id).name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn chain() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut g = SceneGraph::new();
        let root = g.add_node("ROOT", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let spine = g.add_node("SPINE", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let head = g.add_node("HEAD", Transform::from_position(Vec3::new(0.0, 0.5, 0.0)));
        g.set_parent(spine, root).unwrap();
        g.set_parent(head, spine).unwrap();
        (g, root, spine, head)
    }

    #[test]
    fn test_world_matrix_accumulates() {
        let (g, _, _, head) = chain();
        let world = g.world_matrix(head).transform_point3(Vec3::ZERO);
        assert!(approx(world, Vec3::new(1.0, 1.5, 0.0)));
    }

    #[test]
    fn test_path() {
        let (g, root, spine, head) = chain();
        assert_eq!(g.path(head, root).as_deref(), Some("SPINE/HEAD"));
        assert_eq!(g.path(root, root).as_deref(), Some(""));
        assert_eq!(g.path(root, spine), None);
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let (mut g, root, _, head) = chain();
        assert!(matches!(g.set_parent(root, head), Err(ForgeError::SceneError(_))));
        assert!(g.set_parent(root, root).is_err());
    }

    #[test]
    fn test_reparent_moves_child_list() {
        let (mut g, root, spine, head) = chain();
        g.set_parent(head, root).unwrap();
        assert!(g.children(spine).is_empty());
        assert_eq!(g.children(root), &[spine, head]);
        assert_eq!(g.roots().collect::<Vec<_>>(), vec![root]);
    }

    #[test]
    fn test_attach_preserving_world() {
        let mut g = SceneGraph::new();
        let parent = g.add_node(
            "CHEST",
            Transform::from_position_rotation(Vec3::new(10.0, 0.0, 5.0), Quat::from_rotation_y(1.2)),
        );
        let child = g.add_node("LID", Transform::from_position(Vec3::new(10.5, 1.0, 5.0)));
        let before = g.world_matrix(child).transform_point3(Vec3::ZERO);

        g.attach_preserving_world(child, parent).unwrap();

        let after = g.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!(approx(before, after));
        assert_eq!(g.parent(child), Some(parent));
    }

    #[test]
    fn test_depth_first_order() {
        let (mut g, root, spine, head) = chain();
        let arm = g.add_node("ARM", Transform::IDENTITY);
        g.set_parent(arm, root).unwrap();
        assert_eq!(g.depth_first(root), vec![root, spine, head, arm]);
        assert_eq!(g.find(root, "ARM"), Some(arm));
    }

    #[test]
    fn test_truncate_rolls_back_additions() {
        let (mut g, root, spine, _) = chain();
        let mark = g.len();
        let extra = g.add_node("SWORD", Transform::IDENTITY);
        g.set_parent(extra, spine).unwrap();
        g.add_component(
            root,
            Component::SkinnedMeshRenderer {
                mesh: None,
                bones: vec![spine, extra],
                materials: Vec::new(),
            },
        );
        g.truncate(mark);
        assert_eq!(g.len(), 3);
        assert_eq!(g.children(spine).len(), 1);
        match &g.components(root)[0] {
            Component::SkinnedMeshRenderer { bones, .. } => assert_eq!(bones, &vec![spine]),
            other => panic!("unexpected component {:?}", other),
        }
    }

    #[test]
    fn test_copy_subtree_remaps_components() {
        let (mut g, root, spine, head) = chain();
        g.add_component(
            root,
            Component::SkinnedMeshRenderer {
                mesh: None,
                bones: vec![spine, head],
                materials: Vec::new(),
            },
        );

        let mut stage = SceneGraph::new();
        stage.add_node("EXISTING", Transform::IDENTITY);
        let copy = stage.copy_subtree(&g, spine);
        assert_eq!(stage.len(), 3);
        assert_eq!(stage.node(copy).name, "SPINE");
        assert_eq!(stage.parent(copy), None);
        assert_eq!(stage.children(copy).len(), 1);

        let root_copy = stage.copy_subtree(&g, root);
        match &stage.components(root_copy)[0] {
            Component::SkinnedMeshRenderer { bones, .. } => {
                assert_eq!(stage.node(bones[0]).name, "SPINE");
                assert_eq!(stage.parent(bones[0]), Some(root_copy));
                assert!(bones.iter().all(|b| b.index() >= 3));
            }
            other => panic!("unexpected component {:?}", other),
        }
    }
}
