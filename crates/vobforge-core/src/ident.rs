//! Identifier normalization for archive file names.
//!
//! Archive lookups are case-insensitive and identifiers frequently arrive with
//! the wrong extension (a scene object references `CHEST.ASC` while the archive
//! holds `CHEST.MDL`), so every importer reduces names to an upper-cased stem
//! before probing candidate extensions.

/// File name without any directory part.
pub fn file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// File name without directory and without its last extension.
pub fn stem(name: &str) -> &str {
    let file = file_name(name);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

/// Upper-cased extension, if any.
pub fn extension(name: &str) -> Option<String> {
    let file = file_name(name);
    match file.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file.len() => Some(file[dot + 1..].to_ascii_uppercase()),
        _ => None,
    }
}

/// Upper-cased stem, the key every cache and asset path is built from.
pub fn normalize(name: &str) -> String {
    stem(name).to_ascii_uppercase()
}

/// Normalized stem with a replacement extension.
pub fn with_extension(name: &str, ext: &str) -> String {
    format!("{}.{}", normalize(name), ext.to_ascii_uppercase())
}
