//! vobforge Import - converts decoded records into engine assets
//!
//! The `Importer` owns the mounted archives, the decoder, the asset store and
//! the per-run `AssetCache`. Its entry points rebuild skeletons, bind skins,
//! resample animations, build blend shapes and walk scene object trees,
//! persisting every derived asset once and instantiating live copies into the
//! importer's stage graph.

mod config;
mod container;
mod convert;
mod material;
mod models;
mod morph;
mod report;
mod script;
mod session;
mod skeleton;
mod skin;
mod texture;
mod vobs;

pub use config::{
    AnimationSettings, ImportConfig, MaterialSettings, MaterialTemplate, MeshSettings,
    PrefabSettings, SkeletonSettings,
};
pub use container::parse_container_contents;
pub use convert::{convert_mesh, flip_winding};
pub use material::material_name;
pub use morph::MorphBlendBuilder;
pub use report::{ImportReport, ImportWarning};
pub use script::ScriptData;
pub use session::{Importer, WorldImport, WorldNodes};
pub use skeleton::{parent_indices, BuiltSkeleton, SkeletonBuilder};
pub use skin::{SkinBinder, SkinnedVertex};
pub use texture::convert_texture;
pub use vobs::SceneGraphImporter;
