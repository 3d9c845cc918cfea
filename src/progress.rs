//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce la progress bar e il report finale di una run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche della run (file raccolti, derivati scritti, errori)
//! - Raccolta dei fallimenti per singolo derivato invece di abortire la run
//! - Report finale con statistiche aggregate
//!
//! ## Componenti principali:
//! - `ProgressManager`: Gestisce la progress bar sui derivati
//! - `RunReport`: Statistiche cumulative e lista dei fallimenti
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [=================>----------------------] 42/96 (43%) [OK] a/b/photo.webp
//! ```

use crate::codec::TargetFormat;
use crate::file_manager::format_size;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Manages progress reporting for a conversion run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager over `total` derivatives
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that never draws (JSON mode)
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total);
        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// A derivative that could not be produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivativeFailure {
    /// Source path relative to the source root
    pub source: String,
    pub format: TargetFormat,
    pub error: String,
}

/// Statistics and failures of a conversion run
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    pub files_collected: usize,
    pub directories_mirrored: usize,
    pub derivatives_written: usize,
    pub derivatives_resized: usize,
    pub bytes_written: u64,
    pub failures: Vec<DerivativeFailure>,
    pub duration_seconds: f64,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_written(&mut self, bytes_written: u64, resized: bool) {
        self.derivatives_written += 1;
        self.bytes_written += bytes_written;
        if resized {
            self.derivatives_resized += 1;
        }
    }

    pub fn add_failure(&mut self, failure: DerivativeFailure) {
        self.failures.push(failure);
    }

    /// Derivatives expected for the collected files
    pub fn derivatives_expected(&self) -> usize {
        self.files_collected * TargetFormat::ALL.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Files: {} | Directories: {} | Written: {} (resized: {}) | Errors: {} | Output size: {}",
            self.files_collected,
            self.directories_mirrored,
            self.derivatives_written,
            self.derivatives_resized,
            self.failures.len(),
            format_size(self.bytes_written)
        )
    }
}
