//! Asset stores: where converted assets are written and read back

use crate::catalog::AssetCatalog;
use crate::kind::AssetKind;
use crate::meta::{AssetFile, AssetMeta};
use crate::path::AssetPath;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use vobforge_core::{ContentHash, ForgeError, Result};

/// Persistence layer for converted assets. Payloads are TOML documents.
pub trait AssetStore {
    fn exists(&self, path: &AssetPath) -> bool;
    fn read(&self, path: &AssetPath) -> Result<toml::Value>;
    fn write(&mut self, path: &AssetPath, meta: AssetMeta, value: toml::Value) -> Result<()>;
    fn meta(&self, path: &AssetPath) -> Option<AssetMeta>;
    /// Store-relative paths of every asset of `kind`, sorted
    fn list(&self, kind: AssetKind) -> Vec<String>;
}

impl<S: AssetStore + ?Sized> AssetStore for Box<S> {
    fn exists(&self, path: &AssetPath) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &AssetPath) -> Result<toml::Value> {
        (**self).read(path)
    }

    fn write(&mut self, path: &AssetPath, meta: AssetMeta, value: toml::Value) -> Result<()> {
        (**self).write(path, meta, value)
    }

    fn meta(&self, path: &AssetPath) -> Option<AssetMeta> {
        (**self).meta(path)
    }

    fn list(&self, kind: AssetKind) -> Vec<String> {
        (**self).list(kind)
    }
}

/// Typed access on top of any `AssetStore`
pub trait AssetStoreExt: AssetStore {
    fn load<T: DeserializeOwned>(&self, path: &AssetPath) -> Result<T> {
        let value = self.read(path)?;
        value
            .try_into()
            .map_err(|e: toml::de::Error| ForgeError::AssetError(format!("{}: {}", path, e)))
    }

    /// Serialize `value`, hash it and write it with fresh metadata
    fn save<T: Serialize>(&mut self, path: &AssetPath, value: &T, source: Option<&str>) -> Result<AssetMeta> {
        let value = toml::Value::try_from(value)?;
        let hash = ContentHash::of_str(&toml::to_string(&value)?);
        let meta = AssetMeta {
            name: path.name().to_string(),
            kind: path.kind(),
            path: path.relative(),
            hash: hash.to_prefixed_hex(),
            source: source.map(str::to_string),
            properties: BTreeMap::new(),
        };
        self.write(path, meta.clone(), value)?;
        log::info!("Saved {}", path);
        Ok(meta)
    }
}

impl<S: AssetStore + ?Sized> AssetStoreExt for S {}

/// Keeps assets in memory. Counts writes per path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    assets: BTreeMap<String, (AssetMeta, toml::Value)>,
    writes: BTreeMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self, path: &AssetPath) -> usize {
        self.writes.get(&path.relative()).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetStore for MemoryStore {
    fn exists(&self, path: &AssetPath) -> bool {
        self.assets.contains_key(&path.relative())
    }

    fn read(&self, path: &AssetPath) -> Result<toml::Value> {
        self.assets
            .get(&path.relative())
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ForgeError::AssetError(format!("Asset not found: {}", path)))
    }

    fn write(&mut self, path: &AssetPath, meta: AssetMeta, value: toml::Value) -> Result<()> {
        let key = path.relative();
        *self.writes.entry(key.clone()).or_default() += 1;
        self.assets.insert(key, (meta, value));
        Ok(())
    }

    fn meta(&self, path: &AssetPath) -> Option<AssetMeta> {
        self.assets.get(&path.relative()).map(|(meta, _)| meta.clone())
    }

    fn list(&self, kind: AssetKind) -> Vec<String> {
        self.assets
            .values()
            .filter(|(meta, _)| meta.kind == kind)
            .map(|(meta, _)| meta.path.clone())
            .collect()
    }
}

/// Writes each asset as a TOML file under `root` with a `.asset.toml` sidecar
pub struct DirectoryStore {
    root: PathBuf,
    catalog: AssetCatalog,
}

impl DirectoryStore {
    /// Open a store rooted at `root`, indexing any existing sidecars
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let catalog = AssetCatalog::load_from_directory(&root)?;
        Ok(Self { root, catalog })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    fn file_path(&self, path: &AssetPath) -> PathBuf {
        self.root.join(path.relative())
    }

    fn sidecar_path(&self, path: &AssetPath) -> PathBuf {
        self.root.join(format!("{}.asset.toml", path.relative()))
    }
}

impl AssetStore for DirectoryStore {
    fn exists(&self, path: &AssetPath) -> bool {
        self.file_path(path).is_file()
    }

    fn read(&self, path: &AssetPath) -> Result<toml::Value> {
        let file = self.file_path(path);
        let content = fs::read_to_string(&file).map_err(|e| {
            ForgeError::AssetError(format!("Failed to read {}: {}", file.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn write(&mut self, path: &AssetPath, meta: AssetMeta, value: toml::Value) -> Result<()> {
        let file = self.file_path(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, toml::to_string(&value)?)?;

        let sidecar = AssetFile { asset: meta };
        fs::write(self.sidecar_path(path), toml::to_string(&sidecar)?)?;
        self.catalog.register(sidecar.asset);
        Ok(())
    }

    fn meta(&self, path: &AssetPath) -> Option<AssetMeta> {
        self.catalog.get(&path.relative()).cloned()
    }

    fn list(&self, kind: AssetKind) -> Vec<String> {
        self.catalog
            .by_kind(kind)
            .into_iter()
            .map(|meta| meta.path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        frames: u32,
    }

    fn payload() -> Payload {
        Payload {
            name: "S_RUN".into(),
            frames: 24,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        let path = AssetPath::in_folder(AssetKind::Animation, "HUMANS", "S_RUN");
        assert!(!store.exists(&path));

        let meta = store.save(&path, &payload(), Some("HUMANS-S_RUN.MAN")).unwrap();
        assert!(meta.hash.starts_with("sha256:"));
        assert_eq!(meta.path, "Animations/HUMANS/S_RUN.asset");
        assert!(store.exists(&path));

        let back: Payload = store.load(&path).unwrap();
        assert_eq!(back, payload());
        assert_eq!(store.writes(&path), 1);
        assert_eq!(store.list(AssetKind::Animation), vec![meta.path]);
    }

    #[test]
    fn test_load_missing_fails() {
        let store = MemoryStore::new();
        let result: Result<Payload> = store.load(&AssetPath::new(AssetKind::Rig, "ORC"));
        assert!(matches!(result, Err(ForgeError::AssetError(_))));
    }

    #[test]
    fn test_directory_store_persists_sidecars() {
        let dir = std::env::temp_dir().join(format!("vobforge_store_{}", uuid::Uuid::new_v4()));
        let path = AssetPath::in_folder(AssetKind::Animation, "HUMANS", "S_RUN");
        {
            let mut store = DirectoryStore::open(&dir).unwrap();
            store.save(&path, &payload(), Some("HUMANS-S_RUN.MAN")).unwrap();
            assert!(dir.join("Animations/HUMANS/S_RUN.asset").is_file());
            assert!(dir.join("Animations/HUMANS/S_RUN.asset.asset.toml").is_file());
        }

        // A reopened store sees the earlier run's assets
        let store = DirectoryStore::open(&dir).unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.meta(&path).unwrap().source.as_deref(), Some("HUMANS-S_RUN.MAN"));
        let back: Payload = store.load(&path).unwrap();
        assert_eq!(back, payload());

        let _ = fs::remove_dir_all(&dir);
    }
}
