//! Decoder traits, one implementation per record kind

use crate::archive::Vdfs;
use crate::lease::Decoded;
use crate::records::{
    AnimationRecord, MeshLibRecord, MeshRecord, MorphRecord, ScriptRecord, TextureRecord,
    WorldRecord,
};
use vobforge_core::Result;

/// Opens one kind of record by file name.
///
/// The returned `Decoded` owns the native handle; it is released when the
/// guard is dropped, on every exit path.
pub trait RecordDecoder<R> {
    fn decode(&self, archive: &Vdfs, name: &str) -> Result<Decoded<R>>;
}

/// Every record kind the importers consume
pub trait Decoder:
    RecordDecoder<MeshRecord>
    + RecordDecoder<MeshLibRecord>
    + RecordDecoder<AnimationRecord>
    + RecordDecoder<MorphRecord>
    + RecordDecoder<ScriptRecord>
    + RecordDecoder<TextureRecord>
    + RecordDecoder<WorldRecord>
{
    fn mesh(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MeshRecord>> {
        RecordDecoder::<MeshRecord>::decode(self, archive, name)
    }

    fn mesh_lib(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MeshLibRecord>> {
        RecordDecoder::<MeshLibRecord>::decode(self, archive, name)
    }

    fn animation(&self, archive: &Vdfs, name: &str) -> Result<Decoded<AnimationRecord>> {
        RecordDecoder::<AnimationRecord>::decode(self, archive, name)
    }

    fn morph(&self, archive: &Vdfs, name: &str) -> Result<Decoded<MorphRecord>> {
        RecordDecoder::<MorphRecord>::decode(self, archive, name)
    }

    fn script(&self, archive: &Vdfs, name: &str) -> Result<Decoded<ScriptRecord>> {
        RecordDecoder::<ScriptRecord>::decode(self, archive, name)
    }

    fn texture(&self, archive: &Vdfs, name: &str) -> Result<Decoded<TextureRecord>> {
        RecordDecoder::<TextureRecord>::decode(self, archive, name)
    }

    fn world(&self, archive: &Vdfs, name: &str) -> Result<Decoded<WorldRecord>> {
        RecordDecoder::<WorldRecord>::decode(self, archive, name)
    }
}

impl<T> Decoder for T where
    T: RecordDecoder<MeshRecord>
        + RecordDecoder<MeshLibRecord>
        + RecordDecoder<AnimationRecord>
        + RecordDecoder<MorphRecord>
        + RecordDecoder<ScriptRecord>
        + RecordDecoder<TextureRecord>
        + RecordDecoder<WorldRecord>
{
}
