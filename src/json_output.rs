//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico
//! (`--json`).
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout per ogni evento della run
//! - Riusa `RunReport` e `Config` per i payload
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio run, con configurazione e numero di file
//! - `stage`: Transizione della macchina a stati della pipeline
//! - `derivative_complete`: Fine produzione di un derivato (ok o errore)
//! - `complete`: Fine run con report finale
//! - `error`: Errore fatale

use crate::{codec::TargetFormat, config::Config, pipeline::Stage, progress::RunReport};
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della run
    #[serde(rename = "start")]
    Start {
        source_dir: PathBuf,
        output_dir: PathBuf,
        config: JsonConfig,
    },

    /// Transizione di stato della pipeline
    #[serde(rename = "stage")]
    Stage { stage: Stage },

    /// Fine produzione di un derivato
    #[serde(rename = "derivative_complete")]
    DerivativeComplete {
        source: String,
        target: String,
        format: TargetFormat,
        resized: bool,
        bytes_written: u64,
        current: usize,
        total: usize,
        error: Option<String>,
    },

    /// Run completata
    #[serde(rename = "complete")]
    Complete { report: RunReport },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub allowed_formats: Vec<String>,
    pub quality: u8,
    pub max_dimension: u32,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config) -> Self {
        Self::Start {
            source_dir: config.source_dir.clone(),
            output_dir: config.output_dir.clone(),
            config: JsonConfig::from(config),
        }
    }

    pub fn stage(stage: Stage) -> Self {
        Self::Stage { stage }
    }

    pub fn complete(report: &RunReport) -> Self {
        Self::Complete {
            report: report.clone(),
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            allowed_formats: config.allowed_formats.clone(),
            quality: config.quality,
            max_dimension: config.max_dimension,
        }
    }
}
