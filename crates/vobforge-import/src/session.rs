//! The import session: owns archives, decoder, store, cache and stage

use crate::config::ImportConfig;
use crate::report::{ImportReport, ImportWarning};
use crate::script::ScriptData;
use crate::skeleton::{BuiltSkeleton, SkeletonBuilder};
use crate::vobs::SceneGraphImporter;
use std::rc::Rc;
use vobforge_asset::{
    AssetCache, AssetKind, AssetPath, AssetStore, AssetStoreExt, CacheKey, Cached, DirectoryStore, StagedStore,
};
use vobforge_core::{ident, ForgeError, Result, UnitScale};
use vobforge_decode::{Archive, Decoder, IdentifierResolver, RawNodeRecord, Vdfs, VobRecord};
use vobforge_scene::{AssetRef, NodeId, Prefab, SceneGraph};

/// Which parts of a world to import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldImport {
    pub mesh: bool,
    pub vobs: bool,
}

impl Default for WorldImport {
    fn default() -> Self {
        Self { mesh: true, vobs: true }
    }
}

/// Live nodes created by a world import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldNodes {
    pub mesh: Option<NodeId>,
    pub vobs: Vec<NodeId>,
}

/// Drives every import entry point.
///
/// Each entry point either completes or leaves no trace: writes go through a
/// `StagedStore` that is committed on success and rolled back on a fatal
/// error, together with the cache and any nodes added to the stage.
pub struct Importer<S: AssetStore> {
    pub(crate) archive: Vdfs,
    pub(crate) decoder: Box<dyn Decoder>,
    pub(crate) store: StagedStore<S>,
    pub(crate) config: ImportConfig,
    pub(crate) cache: AssetCache,
    pub(crate) stage: SceneGraph,
    pub(crate) report: ImportReport,
}

impl Importer<DirectoryStore> {
    /// Importer writing into a directory store at the configured asset root
    pub fn open(archive: Vdfs, decoder: impl Decoder + 'static, config: ImportConfig) -> Result<Self> {
        config.validate()?;
        let store = DirectoryStore::open(&config.asset_root)?;
        Self::new(archive, decoder, store, config)
    }
}

impl<S: AssetStore> Importer<S> {
    pub fn new(archive: Vdfs, decoder: impl Decoder + 'static, store: S, config: ImportConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Importer ready: {} archives, {} files, asset root {}",
            archive.archives().len(),
            archive.len(),
            config.asset_root
        );
        Ok(Self {
            archive,
            decoder: Box::new(decoder),
            store: StagedStore::new(store),
            config,
            cache: AssetCache::new(),
            stage: SceneGraph::new(),
            report: ImportReport::new(),
        })
    }

    pub fn archive(&self) -> &Vdfs {
        &self.archive
    }

    pub fn all_files(&self) -> Vec<String> {
        self.archive.list()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Graph receiving every live instance
    pub fn stage(&self) -> &SceneGraph {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut SceneGraph {
        &mut self.stage
    }

    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    pub fn take_report(&mut self) -> ImportReport {
        std::mem::take(&mut self.report)
    }

    /// Committed assets
    pub fn store(&self) -> &S {
        self.store.inner()
    }

    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    pub fn resolver(&self) -> IdentifierResolver<'_> {
        IdentifierResolver::new(&self.archive)
    }

    pub fn scale(&self) -> UnitScale {
        self.config.scale()
    }

    /// Run one entry point atomically
    fn run<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.stage.len();
        match op(self) {
            Ok(value) => {
                self.store.commit()?;
                Ok(value)
            }
            Err(e) => {
                log::error!("Import failed: {}", e);
                self.store.rollback();
                self.cache.clear();
                self.stage.truncate(mark);
                Err(e)
            }
        }
    }

    /// Template for `key`, built by `build` only if neither the cache nor the
    /// store has it. `build` returning `None` is remembered for the run.
    pub(crate) fn cached_prefab<F>(&mut self, key: CacheKey, build: F) -> Result<Option<Rc<Prefab>>>
    where
        F: FnOnce(&mut Self) -> Result<Option<Prefab>>,
    {
        match self.cache.lookup(&key)? {
            Cached::Hit(prefab) => return Ok(Some(prefab)),
            Cached::Absent => return Ok(None),
            Cached::Vacant => {}
        }

        let path = key.path();
        if self.store.exists(&path) {
            let prefab: Prefab = self.store.load(&path)?;
            log::debug!("Loaded {} from store", path);
            return Ok(Some(self.cache.adopt(key, prefab)));
        }

        self.cache.begin(&key);
        let built = build(self).and_then(|prefab| {
            if let Some(prefab) = &prefab {
                self.store.save(&path, prefab, Some(key.identifier()))?;
            }
            Ok(prefab)
        });
        match built {
            Ok(prefab) => Ok(self.cache.finish(key, prefab)),
            Err(e) => {
                self.cache.abandon(&key);
                Err(e)
            }
        }
    }

    /// Instantiate the cached template of `kind` for `visual` into the stage
    pub(crate) fn instantiate_model(&mut self, kind: AssetKind, visual: &str) -> Result<Option<NodeId>> {
        let key = CacheKey::new(kind, visual);
        let prefab = match kind {
            AssetKind::StaticModel => self.cached_prefab(key, |this| this.build_static_model(visual)),
            AssetKind::DynamicModel => self.cached_prefab(key, |this| this.build_dynamic(visual)),
            AssetKind::ScriptModel => self.cached_prefab(key, |this| this.build_script_model(visual)),
            AssetKind::Rig => self.cached_prefab(key, |this| this.build_rig(visual)),
            other => Err(ForgeError::AssetError(format!(
                "{} is not a cached model kind",
                other
            ))),
        }?;
        Ok(prefab.map(|p| p.instantiate(&mut self.stage)))
    }

    /// Build a skeleton into `graph`, offsetting a synthetic root by the
    /// first idle animation found for `name`
    pub(crate) fn build_skeleton(
        &mut self,
        graph: &mut SceneGraph,
        name: &str,
        nodes: &[RawNodeRecord],
        synthetic_root: bool,
    ) -> Result<BuiltSkeleton> {
        let builder = SkeletonBuilder::new(self.scale()).with_synthetic_root(synthetic_root);
        let skeleton = builder.build(name, nodes, graph)?;
        if synthetic_root {
            let idle = self
                .resolver()
                .idle_animation(name, &self.config.skeleton.idle_suffixes);
            if let Some(idle) = idle {
                let record = self.decoder.animation(&self.archive, &idle)?;
                if builder.apply_idle_pose(graph, &skeleton, &record) {
                    log::debug!("Offset root of {} by idle pose {}", name, idle);
                }
            }
        }
        Ok(skeleton)
    }

    /// Import a static mesh file as a model
    pub fn import_mesh(&mut self, name: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            let file = ident::file_name(name).to_ascii_uppercase();
            let result = this.cached_prefab(CacheKey::new(AssetKind::StaticModel, &file), |this| {
                let record = this.decoder.mesh(&this.archive, &file)?;
                this.static_model_from(&file, &record).map(Some)
            });
            let prefab = this.report.recover(result)?.flatten();
            Ok(prefab.map(|p| p.instantiate(&mut this.stage)))
        })
    }

    /// Import a morph mesh with its blend shapes
    pub fn import_morph(&mut self, name: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            let result = this
                .decoder
                .morph(&this.archive, name)
                .and_then(|record| this.morph_model_from(name, &record));
            this.report.recover(result)
        })
    }

    /// Import a model library with attached meshes
    pub fn import_dynamic(&mut self, name: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            let result = this.cached_prefab(CacheKey::new(AssetKind::DynamicModel, name), |this| {
                let lib = this.decoder.mesh_lib(&this.archive, name)?;
                this.dynamic_model_from(name, &lib, None)
            });
            let prefab = this.report.recover(result)?.flatten();
            Ok(prefab.map(|p| p.instantiate(&mut this.stage)))
        })
    }

    /// Import a skeleton file as a rig
    pub fn import_skeleton(&mut self, name: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            let result = this.cached_prefab(CacheKey::new(AssetKind::Rig, name), |this| {
                let lib = this.decoder.mesh_lib(&this.archive, name)?;
                this.rig_from(name, &lib).map(Some)
            });
            let prefab = this.report.recover(result)?.flatten();
            Ok(prefab.map(|p| p.instantiate(&mut this.stage)))
        })
    }

    /// Bind the skinned mesh of `name` to the rig of `skeleton`
    pub fn import_skin(&mut self, name: &str, skeleton: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            if !this.archive.exists(name) {
                this.report.warn(ImportWarning::MissingFile(name.to_string()));
                return Ok(None);
            }
            let result = this
                .decoder
                .mesh_lib(&this.archive, name)
                .and_then(|lib| this.skin_model_from(name, &lib, skeleton));
            Ok(this.report.recover(result)?.flatten())
        })
    }

    /// Import `name` as a dynamic model if it has attachments, else as a skin
    pub fn import_skin_or_dynamic(&mut self, name: &str, skeleton: &str) -> Result<Option<NodeId>> {
        self.run(|this| {
            if !this.archive.exists(name) {
                this.report.warn(ImportWarning::MissingFile(name.to_string()));
                return Ok(None);
            }
            let lib = match this.report.recover(this.decoder.mesh_lib(&this.archive, name))? {
                Some(lib) => lib,
                None => return Ok(None),
            };
            let result = if lib.has_attachments() {
                this.cached_prefab(CacheKey::new(AssetKind::DynamicModel, name), |this| {
                    this.dynamic_model_from(name, &lib, Some(skeleton))
                })
                .map(|prefab| prefab.map(|p| p.instantiate(&mut this.stage)))
            } else {
                this.skin_model_from(name, &lib, skeleton)
            };
            Ok(this.report.recover(result)?.flatten())
        })
    }

    /// Resample an animation against the rig of `skeleton`.
    /// Returns the stored clip path, or `None` when the clip was skipped.
    pub fn import_animation(&mut self, name: &str, skeleton: &str) -> Result<Option<AssetPath>> {
        self.run(|this| {
            let result = this.animation_impl(name, skeleton);
            Ok(this.report.recover(result)?.flatten())
        })
    }

    /// Summarize a model script without importing anything
    pub fn inspect_script(&self, name: &str) -> Result<ScriptData> {
        let record = self.decoder.script(&self.archive, name)?;
        Ok(ScriptData::from_record(self.resolver().skeleton(name), &record))
    }

    /// Create (or reuse) the material for a texture name
    pub fn import_material(&mut self, texture: &str) -> Result<AssetRef> {
        let texture = format!(
            "{}.TGA",
            texture
                .to_ascii_uppercase()
                .replace("-C.TEX", "")
                .replace(".TGA", "")
        );
        self.run(|this| this.make_material(&texture, None))
    }

    /// Import the world mesh and/or the scene object tree of a world file
    pub fn import_world(&mut self, name: &str, options: WorldImport) -> Result<WorldNodes> {
        self.run(|this| {
            let world = this.decoder.world(&this.archive, name)?;
            let mut nodes = WorldNodes::default();

            if options.mesh {
                if let Some(mesh) = &world.mesh {
                    let world_name = if world.name.is_empty() { name } else { world.name.as_str() };
                    let prefab = this.cached_prefab(CacheKey::new(AssetKind::StaticModel, world_name), |this| {
                        this.static_model_from(world_name, mesh).map(Some)
                    })?;
                    nodes.mesh = prefab.map(|p| p.instantiate(&mut this.stage));
                }
            }
            if options.vobs {
                nodes.vobs = SceneGraphImporter::new(this).import(&world.vobs)?;
            }
            Ok(nodes)
        })
    }

    /// Import a scene object tree into the stage
    pub fn import_vobs(&mut self, vobs: &[VobRecord]) -> Result<Vec<NodeId>> {
        self.run(|this| SceneGraphImporter::new(this).import(vobs))
    }
}
