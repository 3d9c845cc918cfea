//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della pipeline.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare gli errori di una run
//! - Definisce `CodecError` per i fallimenti di decode/resize/encode
//! - Allega sempre path e operazione agli errori di I/O
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori filesystem (lettura directory, creazione, rimozione, scrittura)
//! - `Codec`: Immagine illeggibile, corrotta o non supportata
//! - `Collision`: Più sorgenti producono lo stesso file di output
//! - `Join`: Task in background andato in panic
//! - `Validation`: Configurazione non valida
//!
//! ## Esempio:
//! ```ignore
//! let bytes = store
//!     .read_file(&path)
//!     .map_err(|source| ConvertError::io("read file", &path, source))?;
//! ```

use std::path::{Path, PathBuf};

/// Errors raised by an `ImageCodec`
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("WebP encoding error: {0}")]
    WebP(String),

    #[error("Invalid dimensions {width}x{height}")]
    Dimensions { width: u32, height: u32 },
}

/// Custom error types for a conversion run
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {operation} failed for {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec error for {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Output collision: {target} would be written from {}", sources.join(", "))]
    Collision { target: String, sources: Vec<String> },

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ConvertError {
    pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn codec(path: &Path, source: CodecError) -> Self {
        Self::Codec {
            path: path.to_path_buf(),
            source,
        }
    }
}
