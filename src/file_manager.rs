//! # File Management Module
//!
//! Questo modulo isola tutte le primitive filesystem usate dalla pipeline.
//!
//! ## Responsabilità:
//! - Definisce il trait `FileStore` (read-dir, mkdir, rm, lstat, read, write)
//! - Fornisce `LocalFileStore`, l'implementazione su disco basata su `std::fs`
//! - Classifica le entry di directory (file, directory, altro)
//! - Utilità per la formattazione human-readable delle dimensioni
//!
//! ## Perché un trait:
//! I componenti (collector, mirror, transcoder) ricevono un `Arc<dyn FileStore>`
//! così i test possono simulare errori di permesso su path specifici.
//!
//! ## Esempio:
//! ```ignore
//! let store = LocalFileStore;
//! for entry in store.read_dir(Path::new("src"))? {
//!     if entry.kind == EntryKind::Directory {
//!         // recurse
//!     }
//! }
//! ```

use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Kind of a directory entry as seen by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// A single entry returned by `FileStore::read_dir`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Filesystem capability consumed by the pipeline
///
/// All methods block; callers run them off the async executor.
pub trait FileStore: Send + Sync {
    /// List the entries of a directory (order unspecified)
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Create a single directory; the parent must exist
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and any missing ancestors
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a symlink (never its target)
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Kind of the entry at `path` without following symlinks, `None` if absent
    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// `FileStore` backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    fn classify(entry: &fs::DirEntry) -> io::Result<EntryKind> {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            return Ok(EntryKind::Directory);
        }
        if file_type.is_file() {
            return Ok(EntryKind::File);
        }
        // Symlink verso file: conta come file. Verso directory: non si scende.
        if file_type.is_symlink() {
            if let Ok(target) = fs::metadata(entry.path()) {
                if target.is_file() {
                    return Ok(EntryKind::File);
                }
            }
        }
        Ok(EntryKind::Other)
    }
}

impl FileStore for LocalFileStore {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let kind = Self::classify(&entry)?;

            match entry.file_name().into_string() {
                Ok(name) => entries.push(DirEntry { name, kind }),
                Err(raw) => {
                    warn!("Skipping non UTF-8 entry in {}: {:?}", path.display(), raw);
                }
            }
        }

        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn entry_kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Ok(Some(kind))
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
