//! Model builders: static meshes, rigs, skins, attached-mesh models, model
//! scripts, morph meshes and animation clips

use crate::convert::convert_mesh;
use crate::morph::MorphBlendBuilder;
use crate::report::ImportWarning;
use crate::session::Importer;
use crate::skin::SkinBinder;
use glam::Quat;
use vobforge_animation::{clip_location, next_clip_name, AnimationResampler, Pose, TrackSource};
use vobforge_asset::{AssetKind, AssetPath, AssetStore, AssetStoreExt, CacheKey};
use vobforge_core::{ident, ForgeError, Result, Transform};
use vobforge_decode::{MeshLibRecord, MeshRecord, MorphRecord, SubmeshRecord};
use vobforge_scene::{AssetRef, AvatarAsset, Component, NodeId, Prefab, SceneGraph};

/// Bones of the skinned renderer on `root`
fn renderer_bones(graph: &SceneGraph, root: NodeId) -> Option<Vec<NodeId>> {
    graph.components(root).iter().find_map(|c| match c {
        Component::SkinnedMeshRenderer { bones, .. } => Some(bones.clone()),
        _ => None,
    })
}

impl<S: AssetStore> Importer<S> {
    fn materials_for(&mut self, submeshes: &[SubmeshRecord]) -> Result<Vec<AssetRef>> {
        if self.config.mesh.load_materials {
            self.make_materials(submeshes)
        } else {
            Ok(Vec::new())
        }
    }

    /// Convert `record` once into `path` and render it on `node`
    fn attach_mesh(
        &mut self,
        graph: &mut SceneGraph,
        node: NodeId,
        path: &AssetPath,
        record: &MeshRecord,
    ) -> Result<()> {
        if !self.store.exists(path) {
            let mesh = convert_mesh(path.name(), record, self.scale());
            self.store.save(path, &mesh, None)?;
        }
        let materials = self.materials_for(&record.submeshes)?;
        graph.add_component(node, Component::MeshFilter { mesh: path.to_ref() });
        graph.add_component(node, Component::MeshRenderer { materials });
        Ok(())
    }

    pub(crate) fn build_static_model(&mut self, visual: &str) -> Result<Option<Prefab>> {
        let Some(file) = self.resolver().static_mesh(visual) else {
            return Ok(None);
        };
        let record = self.decoder.mesh(&self.archive, &file)?;
        self.static_model_from(visual, &record).map(Some)
    }

    pub(crate) fn static_model_from(&mut self, name: &str, record: &MeshRecord) -> Result<Prefab> {
        let name = ident::normalize(name);
        let mut graph = SceneGraph::new();
        let root = graph.add_node(&name, Transform::IDENTITY);
        let path = AssetPath::new(AssetKind::StaticMesh, &name);
        self.attach_mesh(&mut graph, root, &path, record)?;
        Ok(Prefab::package(name, &graph, root))
    }

    pub(crate) fn build_rig(&mut self, visual: &str) -> Result<Option<Prefab>> {
        let Some(file) = self.resolver().skeleton(visual) else {
            return Ok(None);
        };
        let lib = self.decoder.mesh_lib(&self.archive, &file)?;
        self.rig_from(visual, &lib).map(Some)
    }

    /// A skeleton with its avatar and a bone-only skinned renderer on the root
    pub(crate) fn rig_from(&mut self, name: &str, lib: &MeshLibRecord) -> Result<Prefab> {
        let name = ident::normalize(name);
        let mut graph = SceneGraph::new();
        let synthetic = self.config.skeleton.insert_synthetic_root;
        let skeleton = self.build_skeleton(&mut graph, &name, &lib.nodes, synthetic)?;

        let avatar = AvatarAsset {
            name: name.clone(),
            root: name.clone(),
            bones: skeleton.bone_paths(&graph),
        };
        let avatar_path = AssetPath::new(AssetKind::Avatar, &name);
        self.store.save(&avatar_path, &avatar, Some(&name))?;

        graph.add_component(
            skeleton.root,
            Component::Animator {
                avatar: avatar_path.to_ref(),
            },
        );
        graph.add_component(
            skeleton.root,
            Component::SkinnedMeshRenderer {
                mesh: None,
                bones: skeleton.bones.clone(),
                materials: Vec::new(),
            },
        );
        log::info!("Built rig {} with {} bones", name, skeleton.bones.len());
        Ok(Prefab::package(name, &graph, skeleton.root))
    }

    /// Bind the skinned mesh of `lib` to a fresh instance of the `skeleton` rig.
    /// Skins are persisted but not cached; every call yields a new instance.
    pub(crate) fn skin_model_from(
        &mut self,
        name: &str,
        lib: &MeshLibRecord,
        skeleton: &str,
    ) -> Result<Option<NodeId>> {
        let name = ident::normalize(name);
        let skin = lib
            .skin
            .as_ref()
            .ok_or_else(|| ForgeError::DecodeError(format!("{} has no skinned mesh", name)))?;

        let rig = self.cached_prefab(CacheKey::new(AssetKind::Rig, skeleton), |this| this.build_rig(skeleton))?;
        let Some(rig) = rig else {
            self.report.warn(ImportWarning::MissingSkeleton(name));
            return Ok(None);
        };

        let root = rig.instantiate(&mut self.stage);
        let bones = renderer_bones(&self.stage, root)
            .ok_or_else(|| ForgeError::AssetError(format!("Rig {} has no skinned renderer", rig.name)))?;
        let mesh = SkinBinder::from_graph(&self.stage, &bones).skin_mesh(&name, skin, self.scale())?;
        let mesh_path = AssetPath::new(AssetKind::SkinMesh, &name);
        self.store.save(&mesh_path, &mesh, Some(&name))?;

        let skin_materials = self.materials_for(&skin.submeshes)?;
        let node = self.stage.node_mut(root);
        node.name = name.clone();
        for component in &mut node.components {
            if let Component::SkinnedMeshRenderer { mesh, materials, .. } = component {
                *mesh = Some(mesh_path.to_ref());
                *materials = skin_materials.clone();
            }
        }

        let prefab = Prefab::package(name.clone(), &self.stage, root);
        self.store
            .save(&AssetPath::new(AssetKind::SkinModel, &name), &prefab, Some(&name))?;
        Ok(Some(root))
    }

    pub(crate) fn build_dynamic(&mut self, visual: &str) -> Result<Option<Prefab>> {
        let Some(file) = self.resolver().skin(visual) else {
            return Ok(None);
        };
        let lib = self.decoder.mesh_lib(&self.archive, &file)?;
        self.dynamic_model_from(visual, &lib, None)
    }

    /// Meshes attached to the nodes of a skeleton, wrapped in a node named
    /// after the visual.
    ///
    /// The skeleton comes from `lib` itself when it carries nodes, otherwise
    /// from the skeleton file of `skeleton_hint` (or of the visual). Returns
    /// `None`, with a warning, when there is no such file.
    pub(crate) fn dynamic_model_from(
        &mut self,
        visual: &str,
        lib: &MeshLibRecord,
        skeleton_hint: Option<&str>,
    ) -> Result<Option<Prefab>> {
        let name = ident::normalize(visual);

        // Later attachments for the same node replace earlier ones
        let mut attachments: Vec<(&str, &MeshRecord)> = Vec::with_capacity(lib.attachments.len());
        for (node, mesh) in &lib.attachments {
            match attachments.iter_mut().find(|(n, _)| *n == node.as_str()) {
                Some(slot) => {
                    self.report.warn(ImportWarning::DuplicateAttachment(node.clone()));
                    slot.1 = mesh;
                }
                None => attachments.push((node.as_str(), mesh)),
            }
        }

        let mut graph = SceneGraph::new();
        let skeleton = if lib.has_nodes() {
            self.build_skeleton(&mut graph, &name, &lib.nodes, false)?
        } else {
            let source = skeleton_hint.unwrap_or(visual);
            let Some(file) = self.resolver().skeleton(source) else {
                self.report.warn(ImportWarning::MissingSkeleton(name));
                return Ok(None);
            };
            let skeleton_lib = self.decoder.mesh_lib(&self.archive, &file)?;
            let synthetic = self.config.skeleton.insert_synthetic_root;
            self.build_skeleton(&mut graph, &file, &skeleton_lib.nodes, synthetic)?
        };

        for id in graph.depth_first(skeleton.root) {
            let node_name = graph.node(id).name.clone();
            let Some(slot) = attachments.iter().position(|(n, _)| *n == node_name) else {
                continue;
            };
            let (_, mesh) = attachments.remove(slot);
            let path = AssetPath::in_folder(AssetKind::DynamicMesh, &name, &node_name);
            self.attach_mesh(&mut graph, id, &path, mesh)?;
        }
        for (mesh, _) in attachments {
            self.report.warn(ImportWarning::UnattachedMesh {
                mesh: mesh.to_string(),
                visual: name.clone(),
            });
        }

        let top = graph.add_node(&name, Transform::IDENTITY);
        graph.set_parent(skeleton.root, top)?;
        Ok(Some(Prefab::package(name, &graph, top)))
    }

    /// The dynamic model behind a model script
    pub(crate) fn build_script_model(&mut self, visual: &str) -> Result<Option<Prefab>> {
        let Some(file) = self.resolver().script(visual) else {
            return Ok(None);
        };
        let script = self.decoder.script(&self.archive, &file)?;
        let name = ident::normalize(visual);
        if script.mesh_tree.trim().is_empty() {
            self.report.warn(ImportWarning::EmptyMeshTree(name));
            return Ok(None);
        }
        let Some(mesh_file) = self.resolver().skin(&script.mesh_tree) else {
            self.report.warn(ImportWarning::MissingFile(script.mesh_tree.clone()));
            return Ok(None);
        };

        let key = CacheKey::new(AssetKind::DynamicModel, &script.mesh_tree);
        let dynamic = self.cached_prefab(key, |this| {
            let lib = this.decoder.mesh_lib(&this.archive, &mesh_file)?;
            this.dynamic_model_from(&mesh_file, &lib, Some(file.as_str()))
        })?;
        let Some(dynamic) = dynamic else {
            return Ok(None);
        };

        for mesh in &script.registered_meshes {
            self.report.warn(ImportWarning::RegisteredMesh {
                visual: name.clone(),
                mesh: mesh.clone(),
            });
        }

        let mut graph = SceneGraph::new();
        let root = dynamic.instantiate(&mut graph);
        Ok(Some(Prefab::package(name, &graph, root)))
    }

    /// Morph mesh with one blend-shape frame per source frame
    pub(crate) fn morph_model_from(&mut self, name: &str, record: &MorphRecord) -> Result<NodeId> {
        let name = ident::normalize(name);
        let scale = self.scale();
        let mut mesh = convert_mesh(&name, &record.mesh, scale);
        mesh.blend_shapes =
            MorphBlendBuilder::new(&record.mesh.vertex_ids, scale).build(mesh.vertex_count(), &record.blends)?;
        let mesh_path = AssetPath::new(AssetKind::MorphMesh, &name);
        self.store.save(&mesh_path, &mesh, Some(&name))?;

        let materials = self.materials_for(&record.mesh.submeshes)?;
        let mut graph = SceneGraph::new();
        let root = graph.add_node(&name, Transform::IDENTITY);
        graph.add_component(
            root,
            Component::SkinnedMeshRenderer {
                mesh: Some(mesh_path.to_ref()),
                bones: Vec::new(),
                materials,
            },
        );

        let prefab = Prefab::package(name.clone(), &graph, root);
        self.store
            .save(&AssetPath::new(AssetKind::MorphModel, &name), &prefab, Some(&name))?;
        Ok(prefab.instantiate(&mut self.stage))
    }

    /// Resample `name` against the rig of `skeleton` and store the clip
    pub(crate) fn animation_impl(&mut self, name: &str, skeleton: &str) -> Result<Option<AssetPath>> {
        let file = match ident::extension(name) {
            Some(_) => ident::file_name(name).to_ascii_uppercase(),
            None => ident::with_extension(name, "MAN"),
        };
        let record = self.decoder.animation(&self.archive, &file)?;

        let rig = self.cached_prefab(CacheKey::new(AssetKind::Rig, skeleton), |this| this.build_rig(skeleton))?;
        let Some(rig) = rig else {
            self.report.warn(ImportWarning::MissingSkeleton(file));
            return Ok(None);
        };

        let graph = rig.graph();
        let root = rig.root();
        let bones = renderer_bones(graph, root)
            .ok_or_else(|| ForgeError::AssetError(format!("Rig {} has no bones", rig.name)))?;
        let bone_paths: Vec<String> = bones
            .iter()
            .map(|b| graph.path(*b, root).unwrap_or_default())
            .collect();
        // Only a synthetic root lies outside the bone list
        let root_bone = if bones.contains(&root) {
            None
        } else {
            graph
                .children(root)
                .first()
                .and_then(|child| bones.iter().position(|b| b == child))
        };

        let scale = self.scale();
        let samples: Vec<Pose> = record
            .samples
            .iter()
            .map(|s| Pose {
                position: scale.point(s.position),
                rotation: Quat::from_array(s.rotation),
            })
            .collect();
        let source = TrackSource {
            node_indices: &record.node_indices,
            frame_count: record.frame_count,
            frame_rate: record.fps,
            samples: &samples,
        };

        let settings = &self.config.animation;
        let resampler = AnimationResampler::new(settings.extract_root_motion, settings.static_translation_epsilon);
        let (folder, clip_name) = clip_location(&file, skeleton);
        let mut clip = resampler.resample(&clip_name, &source, &bone_paths, root_bone)?;
        clip.next = next_clip_name(skeleton, &record.next);

        let path = AssetPath::in_folder(AssetKind::Animation, &folder, &clip_name);
        self.store.save(&path, &clip, Some(&file))?;
        log::info!("Imported animation {} ({} curves)", path, clip.curves.len());
        Ok(Some(path))
    }
}
