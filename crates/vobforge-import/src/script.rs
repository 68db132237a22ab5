//! Summary of a model script for host-side selection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use vobforge_core::ident;
use vobforge_decode::ScriptRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptData {
    /// Skeleton file resolved for the script, if any
    pub hierarchy: Option<String>,
    pub base_mesh: String,
    pub registered_meshes: Vec<String>,
    /// Distinct animations compiled from a source file
    pub animations: Vec<String>,
}

fn mesh_name(name: &str) -> String {
    name.to_ascii_uppercase().replace(".ASC", "")
}

/// `S_RUN` sorts as `RUN` and `DANCE` as `_DANCE`, which puts names without
/// a two-character prefix after the prefixed ones
fn sort_key(name: &str) -> String {
    if name.len() > 2 && name.as_bytes()[1] == b'_' {
        name[2..].to_string()
    } else {
        format!("_{}", name)
    }
}

impl ScriptData {
    pub fn from_record(hierarchy: Option<String>, record: &ScriptRecord) -> Self {
        let distinct: BTreeSet<String> = record
            .animations
            .iter()
            .filter(|a| !a.asc.is_empty())
            .map(|a| ident::normalize(&a.name))
            .collect();
        let mut animations: Vec<String> = distinct.into_iter().collect();
        animations.sort_by_cached_key(|a| sort_key(a));

        Self {
            hierarchy,
            base_mesh: mesh_name(&record.mesh_tree),
            registered_meshes: record.registered_meshes.iter().map(|m| mesh_name(m)).collect(),
            animations,
        }
    }
}
