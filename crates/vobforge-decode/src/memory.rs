//! In-memory decoder for hosts that already hold decoded records, and for tests

use crate::archive::{Archive, ArchiveSource, MemoryArchive, Vdfs};
use crate::decoder::RecordDecoder;
use crate::lease::{Decoded, LeaseLedger};
use crate::records::{
    AnimationRecord, MeshLibRecord, MeshRecord, MorphRecord, ScriptRecord, TextureRecord,
    WorldRecord,
};
use std::collections::BTreeMap;
use vobforge_core::{ForgeError, Result};

/// Any record the in-memory decoder can serve
#[derive(Debug, Clone)]
pub enum StoredRecord {
    Mesh(MeshRecord),
    MeshLib(MeshLibRecord),
    Animation(AnimationRecord),
    Morph(MorphRecord),
    Script(ScriptRecord),
    Texture(TextureRecord),
    World(WorldRecord),
}

impl StoredRecord {
    fn kind(&self) -> &'static str {
        match self {
            StoredRecord::Mesh(_) => "mesh",
            StoredRecord::MeshLib(_) => "model library",
            StoredRecord::Animation(_) => "animation",
            StoredRecord::Morph(_) => "morph mesh",
            StoredRecord::Script(_) => "model script",
            StoredRecord::Texture(_) => "texture",
            StoredRecord::World(_) => "world",
        }
    }
}

macro_rules! stored_from {
    ($($record:ty => $variant:ident),* $(,)?) => {
        $(impl From<$record> for StoredRecord {
            fn from(record: $record) -> Self {
                StoredRecord::$variant(record)
            }
        })*
    };
}

stored_from! {
    MeshRecord => Mesh,
    MeshLibRecord => MeshLib,
    AnimationRecord => Animation,
    MorphRecord => Morph,
    ScriptRecord => Script,
    TextureRecord => Texture,
    WorldRecord => World,
}

/// Serves records registered by name. Every decode opens a lease on the
/// shared `LeaseLedger`, so callers can verify how often each file was
/// decoded and that every handle was released.
#[derive(Debug, Default)]
pub struct MemoryDecoder {
    name: String,
    records: BTreeMap<String, StoredRecord>,
    ledger: LeaseLedger,
}

impl MemoryDecoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, name: &str, record: impl Into<StoredRecord>) -> &mut Self {
        self.records.insert(name.to_ascii_uppercase(), record.into());
        self
    }

    pub fn with(mut self, name: &str, record: impl Into<StoredRecord>) -> Self {
        self.insert(name, record);
        self
    }

    pub fn ledger(&self) -> LeaseLedger {
        self.ledger.clone()
    }

    /// An archive listing every registered record
    pub fn archive(&self) -> MemoryArchive {
        MemoryArchive::new(self.name.clone()).with_entries(self.records.keys().cloned())
    }

    fn fetch<R: Clone>(
        &self,
        archive: &Vdfs,
        name: &str,
        pick: impl FnOnce(&StoredRecord) -> Option<&R>,
        expected: &str,
    ) -> Result<Decoded<R>> {
        if !archive.exists(name) {
            return Err(ForgeError::MissingAsset(name.to_string()));
        }
        let stored = self
            .records
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| ForgeError::DecodeError(format!("No decoder data for {}", name)))?;
        let record = pick(stored).ok_or_else(|| {
            ForgeError::DecodeError(format!(
                "{} is a {}, expected a {}",
                name,
                stored.kind(),
                expected
            ))
        })?;
        Ok(Decoded::new(record.clone(), self.ledger.open(name)))
    }
}

impl ArchiveSource for MemoryDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

impl RecordDecoder<MeshRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MeshRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::Mesh(r) => Some(r),
            _ => None,
        }, "mesh")
    }
}

impl RecordDecoder<MeshLibRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MeshLibRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::MeshLib(r) => Some(r),
            _ => None,
        }, "model library")
    }
}

impl RecordDecoder<AnimationRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<AnimationRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::Animation(r) => Some(r),
            _ => None,
        }, "animation")
    }
}

impl RecordDecoder<MorphRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MorphRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::Morph(r) => Some(r),
            _ => None,
        }, "morph mesh")
    }
}

impl RecordDecoder<ScriptRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<ScriptRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::Script(r) => Some(r),
            _ => None,
        }, "model script")
    }
}

impl RecordDecoder<TextureRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<TextureRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::Texture(r) => Some(r),
            _ => None,
        }, "texture")
    }
}

impl RecordDecoder<WorldRecord> for MemoryDecoder {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<WorldRecord>> {
        self.fetch(archive, name, |s| match s {
            StoredRecord::World(r) => Some(r),
            _ => None,
        }, "world")
    }
}
