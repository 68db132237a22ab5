//! Plain data records produced by the native decoder.
//!
//! All values are in source units (centimetres) and source conventions
//! (column-major node matrices, clockwise triangle winding). Conversion to
//! engine conventions happens in the importers.

/// Parent index of a node without a parent
pub const NO_PARENT: u32 = 0xffff;

/// One entry of a flat, parent-indexed node list
#[derive(Debug, Clone, PartialEq)]
pub struct RawNodeRecord {
    pub index: u32,
    pub name: String,
    pub parent: u32,
    /// Local transform, column-major
    pub transform: [[f32; 4]; 4],
}

impl RawNodeRecord {
    pub fn parent_index(&self) -> Option<u32> {
        (self.parent != NO_PARENT).then_some(self.parent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmeshRecord {
    pub texture: String,
    /// Packed `0xAARRGGBB`
    pub color: u32,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub submeshes: Vec<SubmeshRecord>,
    /// Current vertex index to original vertex id
    pub vertex_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedVertexRecord {
    /// Bind-local position relative to each influencing bone
    pub positions: [[f32; 3]; 4],
    pub bone_indices: [u8; 4],
    pub weights: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinnedMeshRecord {
    pub vertices: Vec<SkinnedVertexRecord>,
    pub submeshes: Vec<SubmeshRecord>,
}

/// A model library: optional embedded hierarchy, meshes attached to named
/// nodes, and an optional skinned mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshLibRecord {
    pub nodes: Vec<RawNodeRecord>,
    pub attachments: Vec<(String, MeshRecord)>,
    pub skin: Option<SkinnedMeshRecord>,
}

impl MeshLibRecord {
    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSample {
    pub position: [f32; 3],
    /// Quaternion `[x, y, z, w]`
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationRecord {
    /// Skeleton node index driven by each track slot
    pub node_indices: Vec<u32>,
    pub frame_count: u32,
    pub fps: f32,
    /// Frame-major: every slot of frame 0, then every slot of frame 1, ...
    pub samples: Vec<AnimationSample>,
    pub next: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphBlendRecord {
    pub name: String,
    pub frame_count: u32,
    /// Original vertex id for each sample column
    pub indices: Vec<u32>,
    /// `samples[v + indices.len() * frame]`
    pub samples: Vec<[f32; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphRecord {
    pub mesh: MeshRecord,
    pub blends: Vec<MorphBlendRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptAnimation {
    pub name: String,
    pub next: String,
    /// Source file the animation was compiled from, empty for aliases and blends
    pub asc: String,
    pub layer: u32,
    pub blend_in: f32,
    pub blend_out: f32,
    pub flags: u32,
    pub reverse: bool,
    pub first_frame: i32,
    pub last_frame: i32,
    pub max_fps: f32,
    pub speed: f32,
    pub collision_scale: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptRecord {
    pub mesh_tree: String,
    pub registered_meshes: Vec<String>,
    pub animations: Vec<ScriptAnimation>,
}

/// The subset of a DDS surface description the converter needs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DdsHeader {
    pub magic: u32,
    pub flags: u32,
    pub width: u32,
    pub height: u32,
    pub pitch_or_linear_size: u32,
    pub mip_map_count: u32,
    pub pixel_flags: u32,
    pub four_cc: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureRecord {
    pub header: DdsHeader,
    pub payload: Vec<u8>,
    /// RGBA8 pixels, filled by the decoder for formats it decompresses
    pub rgba: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldRecord {
    pub name: String,
    pub mesh: Option<MeshRecord>,
    pub vobs: Vec<crate::VobRecord>,
}
