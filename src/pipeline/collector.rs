//! # Path Collector Module
//!
//! Discovery ricorsiva delle immagini nella directory sorgente.
//!
//! ## Responsabilità:
//! - Visita depth-first dell'albero sorgente tramite `FileStore`
//! - Accumula direttamente una lista piatta di `FileEntry`
//! - Filtra per estensione (case-insensitive) contro l'allow-list
//! - Ordine deterministico: le entry di ogni directory in ordine lessicale
//!
//! ## Errori:
//! Una directory illeggibile fa fallire l'intera raccolta; nessun
//! risultato parziale viene restituito.

use crate::{
    error::ConvertError,
    file_manager::{EntryKind, FileStore},
    pipeline::path_resolver::{FileEntry, RelativePath},
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Walks a source tree and returns the images it contains
#[derive(Clone)]
pub struct PathCollector {
    store: Arc<dyn FileStore>,
    allowed_formats: Vec<String>,
}

impl PathCollector {
    pub fn new(store: Arc<dyn FileStore>, allowed_formats: &[String]) -> Self {
        Self {
            store,
            allowed_formats: allowed_formats.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    /// Collect every allowed image below `source_root`
    pub fn collect(&self, source_root: &Path) -> Result<Vec<FileEntry>, ConvertError> {
        let mut found = Vec::new();
        self.walk(source_root, &RelativePath::root(), &mut found)?;
        Ok(found)
    }

    /// Check whether a path has an allowed extension
    pub fn is_allowed(&self, path: &RelativePath) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_lower = ext.to_lowercase();
                self.allowed_formats.iter().any(|f| *f == ext_lower)
            }
            None => false,
        }
    }

    fn walk(
        &self,
        source_root: &Path,
        directory: &RelativePath,
        found: &mut Vec<FileEntry>,
    ) -> Result<(), ConvertError> {
        let absolute = directory.to_path(source_root);
        let mut entries = self
            .store
            .read_dir(&absolute)
            .map_err(|source| ConvertError::io("read directory", &absolute, source))?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries {
            let path = directory.join(&entry.name);
            match entry.kind {
                EntryKind::Directory => self.walk(source_root, &path, found)?,
                EntryKind::File if self.is_allowed(&path) => found.push(FileEntry::new(path)),
                EntryKind::File => debug!("Ignoring unsupported file: {}", path),
                EntryKind::Other => debug!("Ignoring special entry: {}", path),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::file_manager::LocalFileStore;
    use crate::testing::{write_fixture, FailingStore};
    use tempfile::TempDir;

    fn collector(store: Arc<dyn FileStore>) -> PathCollector {
        PathCollector::new(store, &Config::default().allowed_formats)
    }

    fn paths(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path().as_str()).collect()
    }

    #[test]
    fn test_collects_nested_images_in_lexical_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_fixture(root, "b/photo.png", b"x");
        write_fixture(root, "a/b/c/deep.jpeg", b"x");
        write_fixture(root, "logo.webp", b"x");
        write_fixture(root, "a/first.jpg", b"x");

        let entries = collector(Arc::new(LocalFileStore)).collect(root).unwrap();

        assert_eq!(
            paths(&entries),
            vec!["a/b/c/deep.jpeg", "a/first.jpg", "b/photo.png", "logo.webp"]
        );
    }

    #[test]
    fn test_filters_unsupported_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_fixture(root, "anim.gif", b"x");
        write_fixture(root, "notes.txt", b"x");
        write_fixture(root, "Makefile", b"x");
        write_fixture(root, ".jpg", b"x");
        write_fixture(root, "only-text/readme.md", b"x");
        write_fixture(root, "UPPER.JPG", b"x");
        std::fs::create_dir_all(root.join("empty/dir")).unwrap();

        let entries = collector(Arc::new(LocalFileStore)).collect(root).unwrap();

        assert_eq!(paths(&entries), vec!["UPPER.JPG"]);
    }

    #[test]
    fn test_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let entries = collector(Arc::new(LocalFileStore))
            .collect(temp_dir.path())
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = collector(Arc::new(LocalFileStore))
            .collect(&temp_dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { operation: "read directory", .. }));
    }

    #[test]
    fn test_unreadable_subdirectory_fails_whole_collection() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_fixture(root, "ok/one.png", b"x");
        write_fixture(root, "secret/two.png", b"x");

        let err = collector(Arc::new(FailingStore::new("secret")))
            .collect(root)
            .unwrap_err();

        match err {
            ConvertError::Io { path, .. } => assert!(path.ends_with("secret")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
