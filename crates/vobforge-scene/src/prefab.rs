//! Prefab templates: a self-contained scene subtree stored as one asset

use crate::graph::{NodeId, SceneGraph};
use serde::{Deserialize, Serialize};

/// A reusable template. The template's graph holds exactly one tree whose
/// root is `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    root: NodeId,
    graph: SceneGraph,
}

impl Prefab {
    /// Capture the subtree under `root` as a template named `name`.
    /// The template root takes the template's name.
    pub fn package(name: impl Into<String>, source: &SceneGraph, root: NodeId) -> Self {
        let name = name.into();
        let mut graph = SceneGraph::new();
        let copied = graph.copy_subtree(source, root);
        graph.node_mut(copied).name = name.clone();
        Self {
            name,
            root: copied,
            graph,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    /// Copy the template into `stage` and return the live root
    pub fn instantiate(&self, stage: &mut SceneGraph) -> NodeId {
        stage.copy_subtree(&self.graph, self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{AssetRef, Component};
    use glam::Vec3;
    use vobforge_core::Transform;

    fn chest() -> Prefab {
        let mut g = SceneGraph::new();
        let root = g.add_node("scratch", Transform::IDENTITY);
        let lid = g.add_node("LID", Transform::from_position(Vec3::Y));
        g.set_parent(lid, root).unwrap();
        g.add_component(
            lid,
            Component::MeshFilter {
                mesh: AssetRef("Meshes/Dynamic/CHEST/LID.asset".into()),
            },
        );
        Prefab::package("CHEST", &g, root)
    }

    #[test]
    fn test_package_renames_root() {
        let prefab = chest();
        assert_eq!(prefab.graph().node(prefab.root()).name, "CHEST");
        assert_eq!(prefab.node_count(), 2);
    }

    #[test]
    fn test_instances_are_independent() {
        let prefab = chest();
        let mut stage = SceneGraph::new();
        let a = prefab.instantiate(&mut stage);
        let b = prefab.instantiate(&mut stage);
        assert_ne!(a, b);
        assert_eq!(stage.len(), 4);
        stage.node_mut(a).transform.position = Vec3::X;
        assert_eq!(stage.node(b).transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_prefab_toml_roundtrip() {
        let prefab = chest();
        let text = toml::to_string(&prefab).unwrap();
        let back: Prefab = toml::from_str(&text).unwrap();
        assert_eq!(back.node_count(), 2);
        let mut stage = SceneGraph::new();
        let root = back.instantiate(&mut stage);
        let lid = stage.find(root, "LID").unwrap();
        assert!(matches!(stage.components(lid)[0], Component::MeshFilter { .. }));
    }
}
