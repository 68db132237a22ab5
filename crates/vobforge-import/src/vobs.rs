//! Scene object trees: placed models with interaction metadata

use crate::container::parse_container_contents;
use crate::report::ImportWarning;
use crate::session::Importer;
use vobforge_asset::{AssetKind, AssetStore};
use vobforge_core::{ident, Result, Rgba, Transform, UnitScale};
use vobforge_decode::{VobKind, VobRecord};
use vobforge_scene::{Component, NodeId};

/// Walks scene object records into the importer's stage.
///
/// Each record becomes a node holding an instance of its visual. Records
/// without a usable visual keep a bare node only when they have imported
/// children. Children are attached after their own placement, so their world
/// transforms are kept.
pub struct SceneGraphImporter<'a, S: AssetStore> {
    importer: &'a mut Importer<S>,
}

impl<'a, S: AssetStore> SceneGraphImporter<'a, S> {
    pub fn new(importer: &'a mut Importer<S>) -> Self {
        Self { importer }
    }

    /// Import top-level records, returning the nodes that were created
    pub fn import(&mut self, vobs: &[VobRecord]) -> Result<Vec<NodeId>> {
        let mut roots = Vec::new();
        for vob in vobs {
            if let Some(node) = self.import_vob(vob)? {
                roots.push(node);
            }
        }
        log::info!("Imported {} of {} top-level scene objects", roots.len(), vobs.len());
        Ok(roots)
    }

    fn import_vob(&mut self, vob: &VobRecord) -> Result<Option<NodeId>> {
        let mut children = Vec::with_capacity(vob.children.len());
        for child in &vob.children {
            if let Some(node) = self.import_vob(child)? {
                children.push(node);
            }
        }

        let visual = vob.visual.trim().to_ascii_uppercase();
        let name = if vob.name.is_empty() { visual.clone() } else { vob.name.clone() };

        let mut node = self.instantiate_visual(&visual)?;
        if node.is_none() && !children.is_empty() {
            node = Some(self.importer.stage.add_node(&name, Transform::IDENTITY));
        }
        let Some(node) = node else {
            return Ok(None);
        };

        if vob.kind.is_interactable() {
            self.add_interaction(node, vob, &name);
        }
        if let Some(light) = &vob.light {
            let range = self.importer.scale().length(light.range);
            self.importer.stage.add_component(
                node,
                Component::Light {
                    color: Rgba::from_packed(light.color).to_linear(),
                    range,
                },
            );
        }

        let scale = self.importer.scale();
        let stage = &mut self.importer.stage;
        let scene_node = stage.node_mut(node);
        scene_node.name = name;
        scene_node.transform.position = scale.point(vob.position);
        scene_node.transform.rotation = UnitScale::rotation_rows(&vob.rotation);
        for child in children {
            stage.attach_preserving_world(child, node)?;
        }
        Ok(Some(node))
    }

    fn instantiate_visual(&mut self, visual: &str) -> Result<Option<NodeId>> {
        let prefabs = &self.importer.config.prefabs;
        let kind = match ident::extension(visual).as_deref() {
            Some("3DS") if prefabs.load_static => AssetKind::StaticModel,
            Some("ASC") if prefabs.load_structural => AssetKind::DynamicModel,
            Some("MDS") if prefabs.load_scripts => AssetKind::ScriptModel,
            Some("3DS" | "ASC" | "MDS" | "PFX" | "TGA" | "MMS") => return Ok(None),
            None if visual.is_empty() => return Ok(None),
            _ => {
                self.importer
                    .report
                    .warn(ImportWarning::UnknownVisual(visual.to_string()));
                return Ok(None);
            }
        };

        let reported = self.importer.report.warnings().len();
        let result = self.importer.instantiate_model(kind, visual);
        match self.importer.report.recover(result)?.flatten() {
            Some(node) => Ok(Some(node)),
            None => {
                // One warning per skipped object
                if self.importer.report.warnings().len() == reported {
                    self.importer
                        .report
                        .warn(ImportWarning::MissingVisual(visual.to_string()));
                }
                Ok(None)
            }
        }
    }

    fn add_interaction(&mut self, node: NodeId, vob: &VobRecord, name: &str) {
        let stage = &mut self.importer.stage;
        stage.add_component(node, Component::Interactable);

        if vob.kind.is_lockable() && vob.is_locked() {
            if let Some(lock) = &vob.lock {
                stage.add_component(
                    node,
                    Component::Lockable {
                        code: lock.code.clone(),
                        key: lock.key.clone(),
                    },
                );
            }
        }

        if vob.kind == VobKind::MobContainer {
            let items = match parse_container_contents(&vob.contents) {
                Ok(items) => items,
                Err(e) => {
                    self.importer.report.warn(ImportWarning::InvalidContainer {
                        vob: name.to_string(),
                        reason: e.to_string(),
                    });
                    Vec::new()
                }
            };
            self.importer
                .stage
                .add_component(node, Component::Container { items });
        }
    }
}
