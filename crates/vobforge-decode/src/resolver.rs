//! Candidate-extension probing for asset identifiers

use crate::archive::Archive;
use vobforge_core::ident;

/// Hierarchy files, preferred over full model libraries
pub const SKELETON_EXTENSIONS: &[&str] = &["MDH", "MDL"];
/// Model libraries carrying a skin or attachments
pub const SKIN_EXTENSIONS: &[&str] = &["MDL", "MDM"];
/// Compiled script first, then source
pub const SCRIPT_EXTENSIONS: &[&str] = &["MSB", "MDS"];
/// Compiled progressive meshes
pub const STATIC_MESH_EXTENSIONS: &[&str] = &["MRM"];

/// Maps loosely-specified identifiers to file names that exist in the
/// mounted archives.
pub struct IdentifierResolver<'a> {
    archive: &'a dyn Archive,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(archive: &'a dyn Archive) -> Self {
        Self { archive }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.archive.exists(name)
    }

    /// First `<STEM>.<ext>` that exists, in candidate order
    pub fn first_existing(&self, name: &str, extensions: &[&str]) -> Option<String> {
        let found = extensions
            .iter()
            .map(|ext| ident::with_extension(name, ext))
            .find(|candidate| self.archive.exists(candidate));
        log::debug!("lookup {} {:?} -> {:?}", name, extensions, found);
        found
    }

    pub fn skeleton(&self, name: &str) -> Option<String> {
        self.first_existing(name, SKELETON_EXTENSIONS)
    }

    pub fn skin(&self, name: &str) -> Option<String> {
        self.first_existing(name, SKIN_EXTENSIONS)
    }

    pub fn script(&self, name: &str) -> Option<String> {
        self.first_existing(name, SCRIPT_EXTENSIONS)
    }

    pub fn static_mesh(&self, name: &str) -> Option<String> {
        self.first_existing(name, STATIC_MESH_EXTENSIONS)
    }

    /// First `<SKELETON>-<SUFFIX>.MAN` that exists
    pub fn idle_animation<S: AsRef<str>>(&self, skeleton: &str, suffixes: &[S]) -> Option<String> {
        let stem = ident::normalize(skeleton);
        suffixes
            .iter()
            .map(|suffix| format!("{}-{}.MAN", stem, suffix.as_ref().to_ascii_uppercase()))
            .find(|candidate| self.archive.exists(candidate))
    }

    /// Compressed texture name for a texture reference: `STONE.TGA` -> `STONE-C.TEX`
    pub fn compressed_texture(texture: &str) -> String {
        format!("{}-C.TEX", ident::normalize(texture))
    }
}
