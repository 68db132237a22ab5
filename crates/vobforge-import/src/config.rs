//! Layered import configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `VOBFORGE_ASSET_ROOT`, `VOBFORGE_UNIT_SCALE`
//! 2. Project-local: `.vobforge/import.toml`
//! 3. Global: `~/.vobforge/import.toml`
//!
//! Layers are merged table by table, so a project file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vobforge_core::{ForgeError, Result, UnitScale};

/// Base material that imported materials are derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTemplate {
    pub name: String,
    #[serde(default = "default_shader")]
    pub shader: String,
    #[serde(default = "default_texture_slot")]
    pub texture_slot: String,
}

fn default_shader() -> String {
    "Standard".to_string()
}

fn default_texture_slot() -> String {
    "_MainTex".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    #[serde(default = "default_true")]
    pub load_textures: bool,
    #[serde(default)]
    pub opaque_template: Option<MaterialTemplate>,
    /// Used for textures with an alpha channel
    #[serde(default)]
    pub transparent_template: Option<MaterialTemplate>,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            load_textures: true,
            opaque_template: None,
            transparent_template: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    #[serde(default = "default_true")]
    pub load_materials: bool,
    #[serde(default)]
    pub materials: MaterialSettings,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            load_materials: true,
            materials: MaterialSettings::default(),
        }
    }
}

/// Which visual categories the scene object importer instantiates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabSettings {
    #[serde(default = "default_true")]
    pub load_static: bool,
    #[serde(default = "default_true")]
    pub load_structural: bool,
    #[serde(default = "default_true")]
    pub load_scripts: bool,
}

impl Default for PrefabSettings {
    fn default() -> Self {
        Self {
            load_static: true,
            load_structural: true,
            load_scripts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSettings {
    #[serde(default = "default_true")]
    pub insert_synthetic_root: bool,
    /// Animations tried, in order, for the idle offset of a synthetic root
    #[serde(default = "default_idle_suffixes")]
    pub idle_suffixes: Vec<String>,
}

fn default_idle_suffixes() -> Vec<String> {
    vec!["S_RUN".into(), "S_FISTRUN".into(), "S_S0".into()]
}

impl Default for SkeletonSettings {
    fn default() -> Self {
        Self {
            insert_synthetic_root: true,
            idle_suffixes: default_idle_suffixes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default = "default_true")]
    pub extract_root_motion: bool,
    #[serde(default = "default_epsilon")]
    pub static_translation_epsilon: f32,
}

fn default_epsilon() -> f32 {
    vobforge_animation::STATIC_TRANSLATION_EPSILON
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            extract_root_motion: true,
            static_translation_epsilon: default_epsilon(),
        }
    }
}

/// Resolved import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f32,
    #[serde(default)]
    pub mesh: MeshSettings,
    #[serde(default)]
    pub prefabs: PrefabSettings,
    #[serde(default)]
    pub skeleton: SkeletonSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
}

fn default_asset_root() -> String {
    "Assets/Gothic".to_string()
}

fn default_unit_scale() -> f32 {
    UnitScale::CENTIMETRES.0
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            unit_scale: default_unit_scale(),
            mesh: MeshSettings::default(),
            prefabs: PrefabSettings::default(),
            skeleton: SkeletonSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl ImportConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut merged = toml::Table::new();

        // Layer 1: Global config (~/.vobforge/import.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut merged, Self::load_table(&global_path)?);
            }
        }

        // Layer 2: Project-local config (.vobforge/import.toml)
        let local_path = PathBuf::from(".vobforge/import.toml");
        if local_path.exists() {
            merge_tables(&mut merged, Self::load_table(&local_path)?);
        }

        let mut config: ImportConfig = toml::Value::Table(merged).try_into()?;

        // Layer 3: Environment variable overrides
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config: ImportConfig = toml::Value::Table(Self::load_table(path)?).try_into()?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ImportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn scale(&self) -> UnitScale {
        UnitScale(self.unit_scale)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.unit_scale.is_finite() || self.unit_scale <= 0.0 {
            return Err(ForgeError::ConfigurationError(format!(
                "unit_scale must be a positive number, got {}",
                self.unit_scale
            )));
        }
        let epsilon = self.animation.static_translation_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ForgeError::ConfigurationError(format!(
                "animation.static_translation_epsilon must not be negative, got {}",
                epsilon
            )));
        }
        Ok(())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = lookup("VOBFORGE_ASSET_ROOT") {
            self.asset_root = root;
        }
        if let Some(scale) = lookup("VOBFORGE_UNIT_SCALE") {
            self.unit_scale = scale.trim().parse().map_err(|_| {
                ForgeError::ConfigurationError(format!("VOBFORGE_UNIT_SCALE is not a number: {}", scale))
            })?;
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".vobforge").join("import.toml"))
    }

    fn load_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ForgeError::ConfigurationError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }
}

/// Recursively overlay `overlay` onto `base`; scalar values and arrays replace
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vobforge_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("import.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.asset_root, "Assets/Gothic");
        assert_eq!(config.scale(), UnitScale(0.01));
        assert!(config.mesh.load_materials);
        assert!(config.mesh.materials.opaque_template.is_none());
        assert!(config.prefabs.load_scripts);
        assert_eq!(config.skeleton.idle_suffixes, vec!["S_RUN", "S_FISTRUN", "S_S0"]);
        assert!((config.animation.static_translation_epsilon - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_load_config_from_file() {
        let config_str = r#"
asset_root = "Assets/G1"

[mesh.materials]
load_textures = false

[mesh.materials.opaque_template]
name = "Opaque"

[mesh.materials.transparent_template]
name = "Cutout"
shader = "Legacy/Transparent"

[prefabs]
load_scripts = false
"#;
        let path = temp_config(config_str);
        let mut config = ImportConfig::load_from_file(&path).unwrap();
        // Undo anything the environment of the test runner applied
        config.apply_overrides(|_| None).unwrap();

        assert!(!config.mesh.materials.load_textures);
        assert!(config.mesh.load_materials);
        let opaque = config.mesh.materials.opaque_template.as_ref().unwrap();
        assert_eq!(opaque.shader, "Standard");
        assert_eq!(opaque.texture_slot, "_MainTex");
        assert_eq!(
            config.mesh.materials.transparent_template.as_ref().unwrap().shader,
            "Legacy/Transparent"
        );
        assert!(!config.prefabs.load_scripts);
        assert!(config.prefabs.load_static);
        assert!(config.skeleton.insert_synthetic_root);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_overrides() {
        let mut config = ImportConfig::default();
        config
            .apply_overrides(|name| match name {
                "VOBFORGE_ASSET_ROOT" => Some("Assets/G2".to_string()),
                "VOBFORGE_UNIT_SCALE" => Some(" 1.0 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.asset_root, "Assets/G2");
        assert_eq!(config.unit_scale, 1.0);

        let bad = config.apply_overrides(|name| {
            (name == "VOBFORGE_UNIT_SCALE").then(|| "metres".to_string())
        });
        assert!(matches!(bad, Err(ForgeError::ConfigurationError(_))));
    }

    #[test]
    fn test_merge_keeps_unrelated_keys() {
        let mut base: toml::Table = toml::from_str(
            r#"
unit_scale = 0.01
[mesh]
load_materials = false
[mesh.materials]
load_textures = false
"#,
        )
        .unwrap();
        let overlay: toml::Table = toml::from_str(
            r#"
[mesh.materials]
load_textures = true
"#,
        )
        .unwrap();
        merge_tables(&mut base, overlay);

        let config: ImportConfig = toml::Value::Table(base).try_into().unwrap();
        assert!(!config.mesh.load_materials);
        assert!(config.mesh.materials.load_textures);
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let result = ImportConfig::from_toml_str("unit_scale = 0.0");
        assert!(matches!(result, Err(ForgeError::ConfigurationError(_))));
        assert!(ImportConfig::from_toml_str("").is_ok());
    }
}
