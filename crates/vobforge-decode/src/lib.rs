//! vobforge Decode - the boundary to the native format decoder
//!
//! Everything that touches the proprietary binary formats lives behind the
//! traits in this crate:
//! - `Vdfs` resolves logical file names against mounted archives
//! - `IdentifierResolver` tries candidate extensions for a name
//! - `RecordDecoder<R>` yields plain data records, one impl per record kind
//! - `Decoded<R>` scopes the native handle and releases it on drop

mod archive;
mod decoder;
mod lease;
mod memory;
mod records;
mod resolver;
mod vob;

pub use archive::{Archive, ArchiveSource, DirectoryArchive, MemoryArchive, Vdfs, VdfsBuilder};
pub use decoder::{Decoder, RecordDecoder};
pub use lease::{Decoded, Lease, LeaseLedger};
pub use memory::{MemoryDecoder, StoredRecord};
pub use records::{
    AnimationRecord, AnimationSample, DdsHeader, MeshLibRecord, MeshRecord, MorphBlendRecord,
    MorphRecord, RawNodeRecord, ScriptAnimation, ScriptRecord, SkinnedMeshRecord,
    SkinnedVertexRecord, SubmeshRecord, TextureRecord, WorldRecord, NO_PARENT,
};
pub use resolver::{
    IdentifierResolver, SCRIPT_EXTENSIONS, SKELETON_EXTENSIONS, SKIN_EXTENSIONS,
    STATIC_MESH_EXTENSIONS,
};
pub use vob::{LightRecord, LockRecord, VobKind, VobRecord};
