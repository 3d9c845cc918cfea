//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione immutabile della pipeline.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` passata alla pipeline in costruzione
//! - Raccoglie le costanti fisse (allow-list, qualità, dimensione massima)
//! - Fornisce validazione dei parametri prima di toccare il filesystem
//!
//! ## Parametri di configurazione:
//! - `source_dir`: Directory sorgente (default: `src`)
//! - `output_dir`: Directory di output ricreata ad ogni run (default: `dist`)
//! - `allowed_formats`: Estensioni accettate (`jpg`, `jpeg`, `png`, `webp`)
//! - `quality`: Qualità di encoding JPEG e WebP (80)
//! - `max_dimension`: Larghezza massima in pixel (1920)
//! - `json_output`: Eventi JSON su stdout invece della progress bar
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che max_dimension sia > 0
//! - Controlla che l'allow-list non sia vuota
//! - Rifiuta sorgente e output sovrapposti (uguali o uno dentro l'altro),
//!   confrontando i path reali: l'output viene cancellato ad ogni run
//!
//! ## Esempio:
//! ```ignore
//! let config = Config::new("photos", "public/photos").with_json_output(true);
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Extensions eligible for conversion
pub const ALLOWED_FORMATS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
/// Encoding quality applied to every derivative
pub const QUALITY: u8 = 80;
/// Maximum output width in pixels
pub const MAX_DIMENSION: u32 = 1920;

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the tree to scan
    pub source_dir: PathBuf,
    /// Root of the mirrored output tree (destroyed and recreated each run)
    pub output_dir: PathBuf,
    /// Lowercase extensions eligible for conversion
    pub allowed_formats: Vec<String>,
    /// Encoding quality (1-100)
    pub quality: u8,
    /// Images wider than this are scaled down to it
    pub max_dimension: u32,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("dist"),
            allowed_formats: ALLOWED_FORMATS.iter().map(|f| f.to_string()).collect(),
            quality: QUALITY,
            max_dimension: MAX_DIMENSION,
            json_output: false,
        }
    }
}

impl Config {
    /// Configuration with the fixed constants and the given roots
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.max_dimension == 0 {
            return Err(anyhow::anyhow!("Max dimension must be greater than 0"));
        }

        if self.allowed_formats.is_empty() {
            return Err(anyhow::anyhow!("At least one allowed format is required"));
        }

        // L'output viene rimosso ricorsivamente: confronto sui path reali
        let source = resolve_root(&self.source_dir)?;
        let output = resolve_root(&self.output_dir)?;
        if source.starts_with(&output) || output.starts_with(&source) {
            return Err(anyhow::anyhow!(
                "Output directory {} and source directory {} overlap",
                self.output_dir.display(),
                self.source_dir.display()
            ));
        }

        Ok(())
    }
}

/// Absolute path of `path` with symlinks, `.` and `..` resolved
///
/// Missing trailing components are appended to the deepest existing
/// ancestor, so roots that do not exist yet can still be compared.
fn resolve_root(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if let Ok(real) = absolute.canonicalize() {
        return Ok(real);
    }

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    let mut missing = Vec::new();
    let mut existing = normalized.as_path();
    loop {
        if let Ok(real) = existing.canonicalize() {
            return Ok(missing.iter().rev().fold(real, |acc, name| acc.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(normalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.allowed_formats, vec!["jpg", "jpeg", "png", "webp"]);
        assert_eq!(config.quality, 80);
        assert_eq!(config.max_dimension, 1920);
        assert!(!config.json_output);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 80;
        config.max_dimension = 0;
        assert!(config.validate().is_err());

        config.max_dimension = 1920;
        config.allowed_formats.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_must_not_contain_source() {
        assert!(Config::new("site/src", "site/src").validate().is_err());
        assert!(Config::new("site/src", "site").validate().is_err());
        assert!(Config::new("site/src", "site/src/dist").validate().is_err());
        assert!(Config::new("site/src", "site/dist").validate().is_ok());
    }

    #[test]
    fn test_current_directory_as_output_is_rejected() {
        // `src` è relativo alla working directory dei test
        assert!(Config::new("src", ".").validate().is_err());
        assert!(Config::new("src", "./").validate().is_err());
    }

    #[test]
    fn test_parent_segments_are_resolved() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("site/src");
        std::fs::create_dir_all(&source).unwrap();

        assert!(Config::new(&source, source.join("..")).validate().is_err());
        assert!(Config::new(&source, source.join("../dist/..")).validate().is_err());
        assert!(Config::new(&source, source.join("../dist")).validate().is_ok());
        assert!(Config::new(&source, temp_dir.path().join("missing/../site"))
            .validate()
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_output_is_resolved() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path().join("site");
        std::fs::create_dir_all(site.join("src")).unwrap();
        let alias = temp_dir.path().join("alias");
        std::os::unix::fs::symlink(&site, &alias).unwrap();

        assert!(Config::new(site.join("src"), &alias).validate().is_err());
    }
}
