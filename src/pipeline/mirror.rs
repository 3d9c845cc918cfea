//! # Directory Mirror Module
//!
//! Replica sotto la root di output la struttura delle directory che
//! contengono almeno un'immagine raccolta.
//!
//! Deve completare prima di qualsiasi scrittura del transcoder.

use crate::{
    error::ConvertError,
    file_manager::FileStore,
    pipeline::path_resolver::{FileEntry, RelativePath},
};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Creates the output directory tree for a set of collected files
#[derive(Clone)]
pub struct DirectoryMirror {
    store: Arc<dyn FileStore>,
}

impl DirectoryMirror {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Unique parent directories of `entries`, root excluded
    pub fn directories(entries: &[FileEntry]) -> BTreeSet<RelativePath> {
        entries
            .iter()
            .map(FileEntry::parent)
            .filter(|dir| !dir.is_root())
            .collect()
    }

    /// Create every parent directory under `output_root`; returns how many
    pub fn mirror(&self, output_root: &Path, entries: &[FileEntry]) -> Result<usize, ConvertError> {
        let directories = Self::directories(entries);

        for directory in &directories {
            let absolute = directory.to_path(output_root);
            self.store
                .create_dir_all(&absolute)
                .map_err(|source| ConvertError::io("create directory", &absolute, source))?;
            debug!("Mirrored directory: {}", directory);
        }

        Ok(directories.len())
    }
}
