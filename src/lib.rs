//! # Image Dist Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione immutabile e costanti (allow-list, qualità, max width)
//! - `error`: Tipi di errore custom (`ConvertError`, `CodecError`)
//! - `file_manager`: Trait `FileStore` e implementazione su disco
//! - `codec`: Trait `ImageCodec` e implementazione `image` + `webp`
//! - `pipeline`: Collector, mirror, transcoder e orchestratore
//! - `progress`: Progress bar e `RunReport`
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```ignore
//! use image_dist::{Config, Pipeline};
//!
//! let pipeline = Pipeline::new(Config::new("src", "dist"))?;
//! let report = pipeline.run().await?;
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod pipeline;
pub mod progress;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{ImageCodec, RustCodec, TargetFormat};
pub use config::Config;
pub use error::{CodecError, ConvertError};
pub use file_manager::{FileStore, LocalFileStore};
pub use pipeline::{Pipeline, Stage};
pub use progress::RunReport;
