//! Catalog of stored asset metadata

use crate::kind::AssetKind;
use crate::meta::{AssetFile, AssetMeta};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use vobforge_core::{ForgeError, Result};

/// Known assets indexed by store-relative path
#[derive(Debug, Default)]
pub struct AssetCatalog {
    assets: BTreeMap<String, AssetMeta>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load asset metadata from `.asset.toml` sidecar files in a directory tree
    pub fn load_from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut catalog = Self::new();
        Self::scan_directory(&mut catalog, path.as_ref())?;
        Ok(catalog)
    }

    fn scan_directory(catalog: &mut AssetCatalog, dir: &Path) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                Self::scan_directory(catalog, &path)?;
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".asset.toml"))
            {
                let content = fs::read_to_string(&path)?;
                let file: AssetFile = toml::from_str(&content).map_err(|e| {
                    ForgeError::AssetError(format!("Failed to parse {}: {}", path.display(), e))
                })?;
                catalog.register(file.asset);
            }
        }

        Ok(())
    }

    pub fn register(&mut self, meta: AssetMeta) {
        self.assets.insert(meta.path.clone(), meta);
    }

    pub fn get(&self, path: &str) -> Option<&AssetMeta> {
        self.assets.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    pub fn by_kind(&self, kind: AssetKind) -> Vec<&AssetMeta> {
        self.assets.values().filter(|a| a.kind == kind).collect()
    }

    /// Assets converted from the given archive file
    pub fn by_source(&self, source: &str) -> Vec<&AssetMeta> {
        self.assets
            .values()
            .filter(|a| a.source.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(source)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
