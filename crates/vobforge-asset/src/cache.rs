//! At-most-once construction of prefab templates per `(kind, identifier)`

use crate::kind::AssetKind;
use crate::path::AssetPath;
use std::collections::HashMap;
use std::rc::Rc;
use vobforge_core::{ident, ForgeError, Result};
use vobforge_scene::Prefab;

/// Cache key: asset kind plus normalized identifier (stem, upper-cased)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: AssetKind,
    identifier: String,
}

impl CacheKey {
    pub fn new(kind: AssetKind, identifier: &str) -> Self {
        Self {
            kind,
            identifier: ident::normalize(identifier),
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Conventional store path of the template
    pub fn path(&self) -> AssetPath {
        AssetPath::new(self.kind, &self.identifier)
    }
}

#[derive(Debug)]
enum Slot {
    Building,
    Ready(Rc<Prefab>),
    Absent,
}

/// Result of a cache lookup
#[derive(Debug)]
pub enum Cached {
    Hit(Rc<Prefab>),
    /// Constructed earlier in this run and found to have no source data
    Absent,
    Vacant,
}

/// Memo map from `CacheKey` to the persisted template.
///
/// Entries are never invalidated within a run. A key that is requested again
/// while its own construction is still running is reported as a structural
/// error instead of being built twice.
#[derive(Debug, Default)]
pub struct AssetCache {
    slots: HashMap<CacheKey, Slot>,
    constructions: HashMap<CacheKey, usize>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &CacheKey) -> Result<Cached> {
        match self.slots.get(key) {
            None => Ok(Cached::Vacant),
            Some(Slot::Ready(prefab)) => {
                log::debug!("cache hit {} {}", key.kind, key.identifier);
                Ok(Cached::Hit(Rc::clone(prefab)))
            }
            Some(Slot::Absent) => Ok(Cached::Absent),
            Some(Slot::Building) => Err(ForgeError::StructuralError(format!(
                "{} {} references itself while being built",
                key.kind, key.identifier
            ))),
        }
    }

    /// Claim `key` for construction
    pub fn begin(&mut self, key: &CacheKey) {
        self.slots.insert(key.clone(), Slot::Building);
        *self.constructions.entry(key.clone()).or_default() += 1;
    }

    /// Record the outcome of a construction started with `begin`
    pub fn finish(&mut self, key: CacheKey, prefab: Option<Prefab>) -> Option<Rc<Prefab>> {
        match prefab {
            Some(prefab) => {
                let prefab = Rc::new(prefab);
                self.slots.insert(key, Slot::Ready(Rc::clone(&prefab)));
                Some(prefab)
            }
            None => {
                self.slots.insert(key, Slot::Absent);
                None
            }
        }
    }

    /// Insert a template that already existed in the store
    pub fn adopt(&mut self, key: CacheKey, prefab: Prefab) -> Rc<Prefab> {
        let prefab = Rc::new(prefab);
        self.slots.insert(key, Slot::Ready(Rc::clone(&prefab)));
        prefab
    }

    /// Release a claim whose construction failed
    pub fn abandon(&mut self, key: &CacheKey) {
        if matches!(self.slots.get(key), Some(Slot::Building)) {
            self.slots.remove(key);
        }
    }

    /// Look up `key`, running `build` only when nothing is cached yet
    pub fn get_or_create<F>(&mut self, key: CacheKey, build: F) -> Result<Option<Rc<Prefab>>>
    where
        F: FnOnce() -> Result<Option<Prefab>>,
    {
        match self.lookup(&key)? {
            Cached::Hit(prefab) => return Ok(Some(prefab)),
            Cached::Absent => return Ok(None),
            Cached::Vacant => {}
        }

        self.begin(&key);
        match build() {
            Ok(prefab) => Ok(self.finish(key, prefab)),
            Err(e) => {
                self.abandon(&key);
                Err(e)
            }
        }
    }

    /// How many times construction of `key` was started
    pub fn constructions(&self, key: &CacheKey) -> usize {
        self.constructions.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
