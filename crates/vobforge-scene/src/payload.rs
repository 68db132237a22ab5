//! Engine asset payloads produced by the importers

use crate::component::AssetRef;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Four bone influences per vertex. Weights are stored as decoded and are
/// not guaranteed to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoneWeight {
    pub bones: [u32; 4],
    pub weights: [f32; 4],
}

/// One frame of a blend shape: per-vertex position deltas at `weight`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendShapeFrame {
    pub name: String,
    pub weight: f32,
    pub deltas: Vec<Vec3>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshAsset {
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub normals: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    /// Triangle lists, one per material slot
    #[serde(default)]
    pub submeshes: Vec<Vec<u32>>,
    #[serde(default)]
    pub bone_weights: Vec<BoneWeight>,
    /// Inverse bone world matrices at bind time
    #[serde(default)]
    pub bind_poses: Vec<Mat4>,
    #[serde(default)]
    pub blend_shapes: Vec<BlendShapeFrame>,
}

impl MeshAsset {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.len() / 3).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    Dxt1,
    Dxt5,
    Rgba32,
}

impl TextureFormat {
    /// Formats that carry an alpha channel and need the transparent template
    pub fn has_alpha(&self) -> bool {
        matches!(self, TextureFormat::Dxt5 | TextureFormat::Rgba32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureAsset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_count: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAsset {
    pub name: String,
    /// Template the material was derived from
    pub template: String,
    pub shader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 4]>,
    #[serde(default)]
    pub transparent: bool,
}

/// Bone layout of a rig, used to bind animation clips by path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarAsset {
    pub name: String,
    pub root: String,
    /// Transform path of every bone, by original index
    pub bones: Vec<String>,
}
