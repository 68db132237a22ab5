//! Recovered warnings collected during an import run

use thiserror::Error;
use vobforge_core::{ForgeError, Result};

/// A condition that was logged and recovered from at the asset boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportWarning {
    #[error("Could not find {0}")]
    MissingVisual(String),

    #[error("Missing texture: '{0}'. Check if proper VDFS archives are included.")]
    MissingTexture(String),

    #[error("Failed to find skeleton for {0}")]
    MissingSkeleton(String),

    #[error("Missing file: {0}")]
    MissingFile(String),

    #[error("{0}")]
    EmptyClip(String),

    #[error("Unknown visual type: {0}")]
    UnknownVisual(String),

    #[error("Dropping duplicate attached mesh for bone: {0}")]
    DuplicateAttachment(String),

    #[error("Found non-attached mesh {mesh} in {visual}")]
    UnattachedMesh { mesh: String, visual: String },

    #[error("Interactable {visual} has a registered mesh: {mesh}")]
    RegisteredMesh { visual: String, mesh: String },

    #[error("Invalid contents for {vob}: {reason}")]
    InvalidContainer { vob: String, reason: String },

    #[error("Could not convert texture {name}: {reason}")]
    TextureConversion { name: String, reason: String },

    #[error("{0} has no mesh tree")]
    EmptyMeshTree(String),
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a warning
    pub fn warn(&mut self, warning: ImportWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[ImportWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn take(&mut self) -> Vec<ImportWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Turn a recoverable error into a warning and `None`.
    /// Fatal errors pass through unchanged.
    pub fn recover<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ForgeError::MissingAsset(name)) => {
                self.warn(ImportWarning::MissingFile(name));
                Ok(None)
            }
            Err(ForgeError::EmptyClip(message)) => {
                self.warn(ImportWarning::EmptyClip(message));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            ImportWarning::MissingTexture("STONE.TGA".into()).to_string(),
            "Missing texture: 'STONE.TGA'. Check if proper VDFS archives are included."
        );
        assert_eq!(
            ImportWarning::UnattachedMesh {
                mesh: "ZS_LEFTHAND".into(),
                visual: "CHEST.ASC".into()
            }
            .to_string(),
            "Found non-attached mesh ZS_LEFTHAND in CHEST.ASC"
        );
    }

    #[test]
    fn test_recover_classifies_errors() {
        let mut report = ImportReport::new();
        assert_eq!(report.recover(Ok(3)).unwrap(), Some(3));
        let missing: Result<u32> = Err(ForgeError::MissingAsset("HUMANS.MDH".into()));
        assert_eq!(report.recover(missing).unwrap(), None);
        let empty: Result<u32> = Err(ForgeError::EmptyClip("HUMANS-T_DANCE.MAN is empty".into()));
        assert_eq!(report.recover(empty).unwrap(), None);
        let fatal: Result<u32> = Err(ForgeError::StructuralError("No root nodes found".into()));
        assert!(report.recover(fatal).is_err());

        assert_eq!(
            report.take(),
            vec![
                ImportWarning::MissingFile("HUMANS.MDH".into()),
                ImportWarning::EmptyClip("HUMANS-T_DANCE.MAN is empty".into()),
            ]
        );
        assert!(report.is_empty());
    }
}
