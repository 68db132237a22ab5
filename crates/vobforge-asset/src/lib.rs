//! vobforge Asset - persistence of converted assets
//!
//! Converted assets are written under a conventional directory per kind
//! (`Rigs/`, `Models/Static/`, `Animations/<skeleton>/`, ...) with a
//! `.asset.toml` metadata sidecar. The `AssetCache` memoizes prefab
//! construction so each identifier is converted at most once per run.

mod cache;
mod catalog;
mod kind;
mod meta;
mod path;
mod staging;
mod store;

pub use cache::{AssetCache, CacheKey, Cached};
pub use catalog::AssetCatalog;
pub use kind::AssetKind;
pub use meta::{AssetFile, AssetMeta};
pub use path::AssetPath;
pub use staging::StagedStore;
pub use store::{AssetStore, AssetStoreExt, DirectoryStore, MemoryStore};
