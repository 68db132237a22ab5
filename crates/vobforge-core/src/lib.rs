//! vobforge Core - Foundational types for the vobforge import pipeline
//!
//! This crate provides the types that every other vobforge crate depends on:
//! - `ForgeError` and the `Result` alias
//! - `ContentHash` - SHA-256 based content hashing for persisted assets
//! - `Transform`, `UnitScale`, `Rgba` - engine-side spatial and color types
//! - Identifier normalization for archive file names

mod error;
mod hash;
pub mod ident;
mod types;

pub use error::{ForgeError, Result};
pub use hash::ContentHash;
pub use types::{Rgba, Transform, UnitScale};
