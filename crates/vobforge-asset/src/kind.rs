//! Asset kinds and their conventional directories

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Skeleton prefab with animator and bone list
    Rig,
    Avatar,
    StaticModel,
    SkinModel,
    DynamicModel,
    ScriptModel,
    MorphModel,
    StaticMesh,
    DynamicMesh,
    SkinMesh,
    MorphMesh,
    Animation,
    Material,
    Texture,
}

impl AssetKind {
    pub fn directory(&self) -> &'static str {
        match self {
            AssetKind::Rig => "Rigs",
            AssetKind::Avatar => "Avatars",
            AssetKind::StaticModel => "Models/Static",
            AssetKind::SkinModel => "Models/Skins",
            AssetKind::DynamicModel => "Models/Dynamic",
            AssetKind::ScriptModel => "Models/Scripts",
            AssetKind::MorphModel => "Models/Morphs",
            AssetKind::StaticMesh => "Meshes/Static",
            AssetKind::DynamicMesh => "Meshes/Dynamic",
            AssetKind::SkinMesh => "Meshes/Skins",
            AssetKind::MorphMesh => "Meshes/Morphs",
            AssetKind::Animation => "Animations",
            AssetKind::Material => "Materials",
            AssetKind::Texture => "Textures",
        }
    }

    /// Kinds stored as prefab templates
    pub fn is_prefab(&self) -> bool {
        matches!(
            self,
            AssetKind::Rig
                | AssetKind::StaticModel
                | AssetKind::SkinModel
                | AssetKind::DynamicModel
                | AssetKind::ScriptModel
                | AssetKind::MorphModel
        )
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Material => "mat",
            kind if kind.is_prefab() => "prefab",
            _ => "asset",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Rig => "rig",
            AssetKind::Avatar => "avatar",
            AssetKind::StaticModel => "static model",
            AssetKind::SkinModel => "skin model",
            AssetKind::DynamicModel => "dynamic model",
            AssetKind::ScriptModel => "script model",
            AssetKind::MorphModel => "morph model",
            AssetKind::StaticMesh => "static mesh",
            AssetKind::DynamicMesh => "dynamic mesh",
            AssetKind::SkinMesh => "skin mesh",
            AssetKind::MorphMesh => "morph mesh",
            AssetKind::Animation => "animation",
            AssetKind::Material => "material",
            AssetKind::Texture => "texture",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories() {
        assert_eq!(AssetKind::Rig.directory(), "Rigs");
        assert_eq!(AssetKind::DynamicModel.directory(), "Models/Dynamic");
        assert_eq!(AssetKind::MorphMesh.directory(), "Meshes/Morphs");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(AssetKind::ScriptModel.extension(), "prefab");
        assert_eq!(AssetKind::Material.extension(), "mat");
        assert_eq!(AssetKind::Animation.extension(), "asset");
    }
}
