//! Write-behind staging so a failed import leaves no partial assets behind

use crate::kind::AssetKind;
use crate::meta::AssetMeta;
use crate::path::AssetPath;
use crate::store::AssetStore;
use std::collections::BTreeMap;
use vobforge_core::Result;

/// Buffers writes on top of another store until `commit`.
///
/// Reads see staged assets first, so lookups inside an import observe the
/// import's own output. `rollback` discards everything staged.
pub struct StagedStore<S> {
    inner: S,
    staged: BTreeMap<String, (AssetPath, AssetMeta, toml::Value)>,
}

impl<S: AssetStore> StagedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            staged: BTreeMap::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Flush staged writes to the inner store in path order
    pub fn commit(&mut self) -> Result<()> {
        for (_, (path, meta, value)) in std::mem::take(&mut self.staged) {
            self.inner.write(&path, meta, value)?;
        }
        Ok(())
    }

    pub fn rollback(&mut self) {
        if !self.staged.is_empty() {
            log::warn!("Discarding {} staged assets", self.staged.len());
        }
        self.staged.clear();
    }
}

impl<S: AssetStore> AssetStore for StagedStore<S> {
    fn exists(&self, path: &AssetPath) -> bool {
        self.staged.contains_key(&path.relative()) || self.inner.exists(path)
    }

    fn read(&self, path: &AssetPath) -> Result<toml::Value> {
        match self.staged.get(&path.relative()) {
            Some((_, _, value)) => Ok(value.clone()),
            None => self.inner.read(path),
        }
    }

    fn write(&mut self, path: &AssetPath, meta: AssetMeta, value: toml::Value) -> Result<()> {
        self.staged
            .insert(path.relative(), (path.clone(), meta, value));
        Ok(())
    }

    fn meta(&self, path: &AssetPath) -> Option<AssetMeta> {
        match self.staged.get(&path.relative()) {
            Some((_, meta, _)) => Some(meta.clone()),
            None => self.inner.meta(path),
        }
    }

    fn list(&self, kind: AssetKind) -> Vec<String> {
        let mut paths = self.inner.list(kind);
        paths.extend(
            self.staged
                .values()
                .filter(|(path, _, _)| path.kind() == kind)
                .map(|(path, _, _)| path.relative()),
        );
        paths.sort();
        paths.dedup();
        paths
    }
}
