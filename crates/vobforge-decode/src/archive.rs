//! Archive resolution with a mount-then-finalize lifecycle

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use vobforge_core::{ForgeError, Result};

/// Queryable view over mounted archives
pub trait Archive {
    fn exists(&self, name: &str) -> bool;
    fn list(&self) -> Vec<String>;
}

/// A single archive that can be mounted into a `VdfsBuilder`
pub trait ArchiveSource {
    fn name(&self) -> &str;
    fn entries(&self) -> Result<Vec<String>>;
}

/// An archive whose entry list is given up front
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    entries: Vec<String>,
}

impl MemoryArchive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entries.push(entry.into());
        self
    }

    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(entries.into_iter().map(Into::into));
        self
    }
}

impl ArchiveSource for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.entries.clone())
    }
}

/// An extracted archive on disk. Archives are flat namespaces, so files in
/// nested directories are exposed by file name only.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    name: String,
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            name: root.display().to_string(),
            root,
        }
    }

    fn scan(dir: &Path, out: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::scan(&path, out)?;
            } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                out.push(name.to_string());
            }
        }
        Ok(())
    }
}

impl ArchiveSource for DirectoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(ForgeError::ArchiveError(format!(
                "Archive directory not found: {}",
                self.root.display()
            )));
        }
        let mut out = Vec::new();
        Self::scan(&self.root, &mut out)?;
        Ok(out)
    }
}

/// Collects archives until `finalize` produces a queryable `Vdfs`.
///
/// Existence queries only become available after every archive is mounted.
#[derive(Default)]
pub struct VdfsBuilder {
    sources: Vec<Box<dyn ArchiveSource>>,
}

impl VdfsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(mut self, source: impl ArchiveSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn mount_boxed(&mut self, source: Box<dyn ArchiveSource>) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Index all mounted archives. Later mounts shadow earlier ones.
    pub fn finalize(self) -> Result<Vdfs> {
        let mut entries = HashMap::new();
        let mut archives = Vec::with_capacity(self.sources.len());

        for (slot, source) in self.sources.iter().enumerate() {
            let listed = source.entries()?;
            log::debug!("Mounted {} ({} entries)", source.name(), listed.len());
            for entry in listed {
                entries.insert(entry.to_ascii_uppercase(), slot);
            }
            archives.push(source.name().to_string());
        }

        Ok(Vdfs { entries, archives })
    }
}

/// The finalized, case-insensitive file namespace over all mounted archives
#[derive(Debug, Clone, Default)]
pub struct Vdfs {
    entries: HashMap<String, usize>,
    archives: Vec<String>,
}

impl Vdfs {
    pub fn builder() -> VdfsBuilder {
        VdfsBuilder::new()
    }

    /// Name of the archive that serves `name`
    pub fn provider(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_uppercase())
            .map(|slot| self.archives[*slot].as_str())
    }

    pub fn archives(&self) -> &[String] {
        &self.archives
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Archive for Vdfs {
    fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_uppercase())
    }

    fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }
}
