//! # Pipeline Orchestrator
//!
//! Orchestratore principale: sequenzia gli stadi della run e delega ai
//! componenti specializzati.
//!
//! ## Macchina a stati (strettamente sequenziale, nessun retry):
//! `START → CLEARED → CREATED → COLLECTED → MIRRORED → TRANSCODED → DONE`
//!
//! - Un errore in clear/create/collect/mirror abortisce la run
//! - I fallimenti dei singoli derivati finiscono nel `RunReport`
//! - Nessun cleanup parziale in caso di abort: l'output può restare a metà
//!
//! ## Concorrenza:
//! Tutte le operazioni bloccanti girano su `spawn_blocking`. Ogni derivato
//! è un task indipendente; la run entra in TRANSCODED solo dopo che
//! tutti i task sono terminati.

use crate::{
    codec::{ImageCodec, RustCodec},
    config::Config,
    error::ConvertError,
    file_manager::{EntryKind, FileStore, LocalFileStore},
    json_output::JsonMessage,
    pipeline::{
        collector::PathCollector,
        mirror::DirectoryMirror,
        path_resolver::FileEntry,
        progress_tracker::ProgressTracker,
        transcoder::{DerivativePlan, Transcoder},
    },
    progress::RunReport,
};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// States of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Start,
    Cleared,
    Created,
    Collected,
    Mirrored,
    Transcoded,
    Done,
}

impl Stage {
    /// Next state, `None` after `Done`
    pub fn next(self) -> Option<Stage> {
        match self {
            Self::Start => Some(Self::Cleared),
            Self::Cleared => Some(Self::Created),
            Self::Created => Some(Self::Collected),
            Self::Collected => Some(Self::Mirrored),
            Self::Mirrored => Some(Self::Transcoded),
            Self::Transcoded => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Cleared => "CLEARED",
            Self::Created => "CREATED",
            Self::Collected => "COLLECTED",
            Self::Mirrored => "MIRRORED",
            Self::Transcoded => "TRANSCODED",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Run a blocking closure off the async executor
async fn blocking<T, F>(task: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> Result<T, ConvertError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await?
}

/// Orchestratore della conversione
pub struct Pipeline {
    config: Arc<Config>,
    store: Arc<dyn FileStore>,
    collector: PathCollector,
    mirror: DirectoryMirror,
    transcoder: Transcoder,
}

impl Pipeline {
    /// Pipeline on the local disk with the in-process codec
    pub fn new(config: Config) -> Result<Self, ConvertError> {
        Self::with_capabilities(config, Arc::new(LocalFileStore), Arc::new(RustCodec))
    }

    /// Pipeline with explicit filesystem and codec capabilities
    pub fn with_capabilities(
        config: Config,
        store: Arc<dyn FileStore>,
        codec: Arc<dyn ImageCodec>,
    ) -> Result<Self, ConvertError> {
        config
            .validate()
            .map_err(|e| ConvertError::Validation(e.to_string()))?;

        let collector = PathCollector::new(store.clone(), &config.allowed_formats);
        let mirror = DirectoryMirror::new(store.clone());
        let transcoder = Transcoder::new(store.clone(), codec, &config);

        Ok(Self {
            config: Arc::new(config),
            store,
            collector,
            mirror,
            transcoder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Esegue l'intera run e restituisce il report
    pub async fn run(&self) -> Result<RunReport, ConvertError> {
        let start_time = Instant::now();
        let mut report = RunReport::new();

        if self.config.json_output {
            JsonMessage::start(&self.config).emit();
        } else {
            info!(
                "Converting {} into {} (quality: {}, max width: {}px)",
                self.config.source_dir.display(),
                self.config.output_dir.display(),
                self.config.quality,
                self.config.max_dimension
            );
        }
        self.enter(Stage::Start);

        self.clear_output().await?;
        self.enter(Stage::Cleared);

        self.create_output().await?;
        self.enter(Stage::Created);

        let entries = self.collect().await?;
        report.files_collected = entries.len();
        info!("Images paths collected... ({} files)", entries.len());
        self.enter(Stage::Collected);

        report.directories_mirrored = self.mirror(&entries).await?;
        info!("Output directories created... ({})", report.directories_mirrored);
        self.enter(Stage::Mirrored);

        self.transcode_all(entries, &mut report).await;
        info!("Images processed...");
        self.enter(Stage::Transcoded);

        report.duration_seconds = start_time.elapsed().as_secs_f64();
        if self.config.json_output {
            JsonMessage::complete(&report).emit();
        } else {
            info!("=== Conversion Complete ===");
            info!("{}", report.format_summary());
            info!("Duration: {:.2}s", report.duration_seconds);
        }
        self.enter(Stage::Done);
        info!("Done!");

        Ok(report)
    }

    fn enter(&self, stage: Stage) {
        debug!("Pipeline stage: {}", stage);
        if self.config.json_output {
            JsonMessage::stage(stage).emit();
        }
    }

    /// Rimuove l'output se esiste (check esplicito senza seguire symlink)
    async fn clear_output(&self) -> Result<(), ConvertError> {
        let store = self.store.clone();
        let output_dir = self.config.output_dir.clone();

        let existed = blocking(move || {
            let kind = store
                .entry_kind(&output_dir)
                .map_err(|e| ConvertError::io("inspect output", &output_dir, e))?;

            // Un file o symlink rimasto al posto dell'output viene rimosso come tale
            match kind {
                None => Ok(false),
                Some(EntryKind::Directory) => {
                    store
                        .remove_dir_all(&output_dir)
                        .map_err(|e| ConvertError::io("remove directory", &output_dir, e))?;
                    Ok(true)
                }
                Some(_) => {
                    store
                        .remove_file(&output_dir)
                        .map_err(|e| ConvertError::io("remove file", &output_dir, e))?;
                    Ok(true)
                }
            }
        })
        .await?;

        if existed {
            info!("Output folder cleared...");
        } else {
            info!("Output folder does not exist...");
        }
        Ok(())
    }

    async fn create_output(&self) -> Result<(), ConvertError> {
        let store = self.store.clone();
        let output_dir = self.config.output_dir.clone();

        blocking(move || {
            store
                .create_dir(&output_dir)
                .map_err(|e| ConvertError::io("create directory", &output_dir, e))
        })
        .await?;

        info!("Output folder created...");
        Ok(())
    }

    async fn collect(&self) -> Result<Vec<FileEntry>, ConvertError> {
        let collector = self.collector.clone();
        let source_dir = self.config.source_dir.clone();
        blocking(move || collector.collect(&source_dir)).await
    }

    async fn mirror(&self, entries: &[FileEntry]) -> Result<usize, ConvertError> {
        let mirror = self.mirror.clone();
        let output_dir = self.config.output_dir.clone();
        let entries = entries.to_vec();
        blocking(move || mirror.mirror(&output_dir, &entries)).await
    }

    /// Lancia un task per derivato e attende che terminino tutti
    async fn transcode_all(&self, entries: Vec<FileEntry>, report: &mut RunReport) {
        let plan = DerivativePlan::new(&entries);
        let tracker = ProgressTracker::new(plan.len(), self.config.json_output);

        // Target condivisi: nessuna scrittura, ogni sorgente coinvolta fallisce
        for (target, derivatives) in &plan.collisions {
            warn!(
                "{} sources map to {}, skipping all of them",
                derivatives.len(),
                target
            );
            for derivative in derivatives {
                let error = DerivativePlan::collision_error(target, derivatives);
                tracker.handle_completion(report, derivative, Err(error));
            }
        }

        let mut tasks = FuturesUnordered::new();
        for derivative in plan.unique {
            let transcoder = self.transcoder.clone();
            let source_dir: PathBuf = self.config.source_dir.clone();
            let output_dir: PathBuf = self.config.output_dir.clone();
            let task_derivative = derivative.clone();

            let handle = tokio::task::spawn_blocking(move || {
                transcoder.produce(&source_dir, &output_dir, &task_derivative)
            });

            tasks.push(async move {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(ConvertError::from(e)),
                };
                (derivative, result)
            });
        }

        while let Some((derivative, result)) = tasks.next().await {
            tracker.handle_completion(report, &derivative, result);
        }

        tracker.finish(&report.format_summary());
    }
}
