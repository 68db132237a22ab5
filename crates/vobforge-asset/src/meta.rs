//! Asset metadata sidecars

use crate::kind::AssetKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for a stored asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Store-relative path of the payload
    pub path: String,
    pub hash: String,
    /// Archive file the asset was converted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,
}

impl AssetMeta {
    pub fn with_property(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// TOML sidecar file format for asset metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct AssetFile {
    pub asset: AssetMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_serde() {
        let toml_str = r#"
[asset]
name = "HUMANS"
type = "rig"
path = "Rigs/HUMANS.prefab"
hash = "sha256:a1b2c3"
source = "HUMANS.MDH"

[asset.properties]
bones = 55
"#;

        let file: AssetFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.asset.kind, AssetKind::Rig);
        assert_eq!(file.asset.source.as_deref(), Some("HUMANS.MDH"));
        assert_eq!(file.asset.properties["bones"].as_integer(), Some(55));
    }
}
