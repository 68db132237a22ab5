//! Error types for vobforge

use thiserror::Error;

/// The main error type for import operations
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Malformed skeleton or scene structure. Aborts the asset being imported.
    #[error("Structural error: {0}")]
    StructuralError(String),

    /// Required settings are missing. Aborts the whole run.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing asset: {0}")]
    MissingAsset(String),

    #[error("Empty clip: {0}")]
    EmptyClip(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Scene error: {0}")]
    SceneError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl ForgeError {
    /// Whether the error must unwind to the run driver.
    ///
    /// Missing assets and empty clips are recovered at the asset boundary that
    /// produced them; everything else stops the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ForgeError::MissingAsset(_) | ForgeError::EmptyClip(_))
    }
}

/// Result type alias for vobforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ForgeError {
    fn from(err: toml::ser::Error) -> Self {
        ForgeError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ForgeError::StructuralError("No root nodes found".into()).is_fatal());
        assert!(ForgeError::ConfigurationError("no template".into()).is_fatal());
        assert!(ForgeError::DecodeError("truncated".into()).is_fatal());
        assert!(!ForgeError::MissingAsset("HUMANS.MDH".into()).is_fatal());
        assert!(!ForgeError::EmptyClip("HUMANS-S_RUN.MAN".into()).is_fatal());
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: ForgeError = toml::from_str::<toml::Value>("a = = 1").unwrap_err().into();
        assert!(matches!(err, ForgeError::TomlParseError(_)));
    }
}
