//! Materials and their textures

use crate::report::ImportWarning;
use crate::session::Importer;
use crate::texture::convert_texture;
use vobforge_asset::{AssetKind, AssetPath, AssetStore, AssetStoreExt};
use vobforge_core::{ForgeError, Result, Rgba};
use vobforge_decode::{Archive, IdentifierResolver, SubmeshRecord};
use vobforge_scene::{AssetRef, MaterialAsset, TextureAsset, TextureFormat};

/// Material identifier for a texture name, or for a bare color when the
/// submesh is untextured
pub fn material_name(texture: &str, color: Option<Rgba>) -> String {
    let texture = texture.trim().to_ascii_uppercase();
    if !texture.is_empty() {
        return texture;
    }
    match color {
        Some(color) => format!("UNNAMED({})", color),
        None => "UNNAMED".to_string(),
    }
}

impl<S: AssetStore> Importer<S> {
    /// One material per submesh, in submesh order
    pub(crate) fn make_materials(&mut self, submeshes: &[SubmeshRecord]) -> Result<Vec<AssetRef>> {
        submeshes
            .iter()
            .map(|s| self.make_material(&s.texture, Some(Rgba::from_packed(s.color))))
            .collect()
    }

    pub(crate) fn make_material(&mut self, texture: &str, color: Option<Rgba>) -> Result<AssetRef> {
        let name = material_name(texture, color);
        let path = AssetPath::new(AssetKind::Material, &name.replace(".TGA", ""));
        if self.store.exists(&path) {
            return Ok(path.to_ref());
        }

        let mut texture_ref = None;
        let mut transparent = false;
        if self.config.mesh.materials.load_textures && name.contains(".TGA") {
            if let Some((asset, format)) = self.make_texture(&IdentifierResolver::compressed_texture(&name))? {
                texture_ref = Some(asset);
                transparent = format.has_alpha();
            }
        }

        let materials = &self.config.mesh.materials;
        let template = if transparent {
            materials.transparent_template.as_ref()
        } else {
            materials.opaque_template.as_ref()
        }
        .ok_or_else(|| ForgeError::ConfigurationError("Base material was not provided".into()))?;

        let asset = MaterialAsset {
            name: name.clone(),
            template: template.name.clone(),
            shader: template.shader.clone(),
            color: match (&texture_ref, color) {
                (None, Some(color)) => Some(color.to_linear()),
                _ => None,
            },
            texture: texture_ref,
            transparent,
        };
        self.store.save(&path, &asset, Some(&name))?;
        log::debug!("Created material {}", path);
        Ok(path.to_ref())
    }

    /// Convert a compressed texture once. Returns `None`, with a warning, if
    /// the file is missing or cannot be converted.
    pub(crate) fn make_texture(&mut self, file: &str) -> Result<Option<(AssetRef, TextureFormat)>> {
        let path = AssetPath::new(AssetKind::Texture, &file.replace("-C.TEX", ""));
        if self.store.exists(&path) {
            let existing: TextureAsset = self.store.load(&path)?;
            return Ok(Some((path.to_ref(), existing.format)));
        }
        if !self.archive.exists(file) {
            self.report.warn(ImportWarning::MissingTexture(file.to_string()));
            return Ok(None);
        }

        let converted = self
            .decoder
            .texture(&self.archive, file)
            .and_then(|record| convert_texture(file, &record));
        match converted {
            Ok(texture) => {
                self.store.save(&path, &texture, Some(file))?;
                Ok(Some((path.to_ref(), texture.format)))
            }
            Err(e @ (ForgeError::DecodeError(_) | ForgeError::MissingAsset(_))) => {
                self.report.warn(ImportWarning::TextureConversion {
                    name: file.to_string(),
                    reason: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
