//! Components attached to scene nodes

use crate::graph::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a persisted asset by its store-relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a container's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    MeshFilter {
        mesh: AssetRef,
    },
    MeshRenderer {
        #[serde(default)]
        materials: Vec<AssetRef>,
    },
    /// Renders a mesh deformed by `bones`, indexed like the mesh's bone weights
    SkinnedMeshRenderer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mesh: Option<AssetRef>,
        #[serde(default)]
        bones: Vec<NodeId>,
        #[serde(default)]
        materials: Vec<AssetRef>,
    },
    Animator {
        avatar: AssetRef,
    },
    Interactable,
    Lockable {
        code: String,
        key: String,
    },
    Container {
        #[serde(default)]
        items: Vec<ItemStack>,
    },
    Light {
        color: [f32; 4],
        range: f32,
    },
}

impl Component {
    /// Rewrite node references, dropping those `map` cannot resolve
    pub fn remap_nodes(&mut self, map: impl Fn(NodeId) -> Option<NodeId>) {
        if let Component::SkinnedMeshRenderer { bones, .. } = self {
            *bones = bones.iter().filter_map(|b| map(*b)).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Holder {
        components: Vec<Component>,
    }

    #[test]
    fn test_component_toml_roundtrip() {
        let holder = Holder {
            components: vec![
                Component::Interactable,
                Component::Lockable {
                    code: "LRRL".into(),
                    key: "ITKE_CHEST".into(),
                },
                Component::Container {
                    items: vec![ItemStack {
                        id: "ITMI_GOLD".into(),
                        count: 50,
                    }],
                },
                Component::MeshFilter {
                    mesh: AssetRef("Meshes/Static/CHEST.asset".into()),
                },
            ],
        };
        let text = toml::to_string(&holder).unwrap();
        assert!(text.contains("type = \"lockable\""));
        let back: Holder = toml::from_str(&text).unwrap();
        assert_eq!(back.components, holder.components);
    }
}
