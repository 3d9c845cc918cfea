//! # Path Resolution Module
//!
//! Centralizza la rappresentazione dei path relativi alla root sorgente
//! e il calcolo dei path di output.
//!
//! ## Invarianti di `RelativePath`:
//! - Separatore `/`, nessuno slash iniziale o finale
//! - Nessun segmento vuoto o `.`
//! - Il path vuoto rappresenta la root

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path relative to a source or output root, always normalized
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalize a raw slash-separated path
    pub fn new(raw: &str) -> Self {
        let normalized = raw
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(normalized)
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a single entry name
    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format!("{}/{}", self.0, name))
        }
    }

    /// Every segment except the last; root for top-level entries
    pub fn parent(&self) -> Self {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::root(),
        }
    }

    /// Last segment
    pub fn file_name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    /// Final dot-delimited extension of the last segment.
    /// Names made only of an extension (`.jpg`) have no stem and no extension.
    pub fn extension(&self) -> Option<&str> {
        match self.file_name().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Replace the extension, or append one when there is none
    pub fn with_extension(&self, extension: &str) -> Self {
        let name = self.file_name();
        let stem = match self.extension() {
            Some(ext) => &name[..name.len() - ext.len() - 1],
            None => name,
        };
        self.parent().join(&format!("{}.{}", stem, extension))
    }

    /// Resolve against a filesystem root
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collected image file, relative to the source root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileEntry(RelativePath);

impl FileEntry {
    pub(crate) fn new(path: RelativePath) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &RelativePath {
        &self.0
    }

    /// Directory containing this file (root for top-level files)
    pub fn parent(&self) -> RelativePath {
        self.0.parent()
    }
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(RelativePath::new("/a/b/photo.png").as_str(), "a/b/photo.png");
        assert_eq!(RelativePath::new("./a//b/").as_str(), "a/b");
        assert!(RelativePath::new("/").is_root());
    }

    #[test]
    fn test_join_from_root() {
        let path = RelativePath::root().join("logo.webp");
        assert_eq!(path.as_str(), "logo.webp");
        assert_eq!(path.join("x").as_str(), "logo.webp/x");
    }

    #[test]
    fn test_parent_and_file_name() {
        let path = RelativePath::new("a/b/photo.png");
        assert_eq!(path.parent().as_str(), "a/b");
        assert_eq!(path.file_name(), "photo.png");
        assert!(RelativePath::new("logo.webp").parent().is_root());
    }

    #[test]
    fn test_extension() {
        assert_eq!(RelativePath::new("a/photo.PNG").extension(), Some("PNG"));
        assert_eq!(RelativePath::new("a/archive.tar.gz").extension(), Some("gz"));
        assert_eq!(RelativePath::new("a/README").extension(), None);
        assert_eq!(RelativePath::new("a/.jpg").extension(), None);
        assert_eq!(RelativePath::new("a.b/README").extension(), None);
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(
            RelativePath::new("a/b/photo.png").with_extension("webp").as_str(),
            "a/b/photo.webp"
        );
        assert_eq!(
            RelativePath::new("my.holiday.jpeg").with_extension("jpg").as_str(),
            "my.holiday.jpg"
        );
        assert_eq!(RelativePath::new("raw").with_extension("jpg").as_str(), "raw.jpg");
    }

    #[test]
    fn test_to_path() {
        let root = Path::new("/tmp/dist");
        assert_eq!(
            RelativePath::new("a/b/photo.jpg").to_path(root),
            PathBuf::from("/tmp/dist/a/b/photo.jpg")
        );
        assert_eq!(RelativePath::root().to_path(root), PathBuf::from("/tmp/dist"));
    }
}
