//! # Progress Tracking Module
//!
//! Unifica progress bar, eventi JSON e `RunReport` per i derivati completati.
//! I completamenti arrivano in ordine di fine task, tutti dallo stesso
//! consumer: nessun lock necessario.

use crate::{
    error::ConvertError,
    json_output::JsonMessage,
    pipeline::transcoder::{Derivative, DerivativeOutcome},
    progress::{DerivativeFailure, ProgressManager, RunReport},
};
use tracing::error;

/// Tracks derivative completions for a run
pub struct ProgressTracker {
    pub total: usize,
    json_output: bool,
    progress_manager: ProgressManager,
}

impl ProgressTracker {
    /// Crea un nuovo tracker per `total` derivati
    pub fn new(total: usize, json_output: bool) -> Self {
        let progress_manager = if json_output || total == 0 {
            ProgressManager::hidden(total as u64)
        } else {
            ProgressManager::new(total as u64)
        };

        Self {
            total,
            json_output,
            progress_manager,
        }
    }

    /// Registra il completamento di un derivato nel report
    pub fn handle_completion(
        &self,
        report: &mut RunReport,
        derivative: &Derivative,
        result: Result<DerivativeOutcome, ConvertError>,
    ) {
        let current = self.progress_manager.position() as usize + 1;

        match result {
            Ok(outcome) => {
                report.add_written(outcome.bytes_written, outcome.resized);

                if self.json_output {
                    JsonMessage::DerivativeComplete {
                        source: derivative.source.to_string(),
                        target: derivative.target.to_string(),
                        format: derivative.format,
                        resized: outcome.resized,
                        bytes_written: outcome.bytes_written,
                        current,
                        total: self.total,
                        error: None,
                    }
                    .emit();
                }

                self.progress_manager
                    .update(&format!("[OK] {}", derivative.target));
            }
            Err(e) => {
                error!("Failed to produce {} from {}: {}", derivative.target, derivative.source, e);

                if self.json_output {
                    JsonMessage::DerivativeComplete {
                        source: derivative.source.to_string(),
                        target: derivative.target.to_string(),
                        format: derivative.format,
                        resized: false,
                        bytes_written: 0,
                        current,
                        total: self.total,
                        error: Some(e.to_string()),
                    }
                    .emit();
                }

                report.add_failure(DerivativeFailure {
                    source: derivative.source.to_string(),
                    format: derivative.format,
                    error: e.to_string(),
                });

                self.progress_manager
                    .update(&format!("[ERROR] {}", derivative.target));
            }
        }
    }

    /// Finalizza progress bar
    pub fn finish(&self, summary: &str) {
        self.progress_manager.finish(summary);
    }
}
