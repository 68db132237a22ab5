//! vobforge Scene - the engine-side object model
//!
//! Imported skeletons, models and placed scene objects are built as nodes in
//! an arena `SceneGraph`. Finished subtrees are packaged as `Prefab`
//! templates, persisted, and instantiated back into a live graph on demand.

mod component;
mod graph;
mod payload;
mod prefab;

pub use component::{AssetRef, Component, ItemStack};
pub use graph::{NodeId, SceneGraph, SceneNode};
pub use payload::{
    AvatarAsset, BlendShapeFrame, BoneWeight, MaterialAsset, MeshAsset, TextureAsset, TextureFormat,
};
pub use prefab::Prefab;
