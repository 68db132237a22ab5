//! Conventional store-relative asset paths

use crate::kind::AssetKind;
use std::fmt;
use vobforge_scene::AssetRef;

/// `<kind directory>[/<folder>]/<NAME>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath {
    kind: AssetKind,
    folder: Option<String>,
    name: String,
}

impl AssetPath {
    /// Names are upper-cased; they come from case-insensitive archives.
    pub fn new(kind: AssetKind, name: &str) -> Self {
        Self {
            kind,
            folder: None,
            name: name.to_ascii_uppercase(),
        }
    }

    pub fn in_folder(kind: AssetKind, folder: &str, name: &str) -> Self {
        Self {
            kind,
            folder: Some(folder.to_ascii_uppercase()),
            name: name.to_ascii_uppercase(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }

    pub fn relative(&self) -> String {
        match &self.folder {
            Some(folder) => format!("{}/{}/{}", self.kind.directory(), folder, self.file_name()),
            None => format!("{}/{}", self.kind.directory(), self.file_name()),
        }
    }

    pub fn to_ref(&self) -> AssetRef {
        AssetRef(self.relative())
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            AssetPath::new(AssetKind::Rig, "humans").relative(),
            "Rigs/HUMANS.prefab"
        );
        assert_eq!(
            AssetPath::in_folder(AssetKind::Animation, "humans", "s_run").relative(),
            "Animations/HUMANS/S_RUN.asset"
        );
        assert_eq!(
            AssetPath::new(AssetKind::Material, "UNNAMED(255,0,0,255)").to_ref().as_str(),
            "Materials/UNNAMED(255,0,0,255).mat"
        );
    }
}
