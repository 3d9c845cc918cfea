//! # Transcoder Module
//!
//! Worker per la conversione di un singolo file sorgente nei due derivati
//! (JPEG + WebP).
//!
//! ## Algoritmo per ogni derivato:
//! 1. Legge il file sorgente e ne ricava la larghezza dall'header
//! 2. Se larghezza > max_dimension, ridimensiona a max_dimension (aspect ratio preservato)
//! 3. Ricodifica alla qualità fissa nel formato di destinazione
//! 4. Scrive in `output/<path senza estensione>.<jpg|webp>`
//!
//! Ogni derivato esegue la propria lettura e il proprio decode: i due
//! derivati dello stesso file non condividono stato e possono girare in
//! parallelo.

use crate::{
    codec::{EncodeRequest, ImageCodec, TargetFormat},
    config::Config,
    error::ConvertError,
    file_manager::FileStore,
    pipeline::path_resolver::{FileEntry, RelativePath},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One output file of a source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivative {
    pub source: FileEntry,
    pub format: TargetFormat,
    pub target: RelativePath,
}

impl Derivative {
    pub fn new(source: FileEntry, format: TargetFormat) -> Self {
        let target = source.path().with_extension(format.extension());
        Self {
            source,
            format,
            target,
        }
    }

    /// Both derivatives of a source file
    pub fn all_for(source: &FileEntry) -> [Derivative; 2] {
        TargetFormat::ALL.map(|format| Derivative::new(source.clone(), format))
    }
}

/// Derivatives of a run, split by whether their target path is unique
///
/// `a/photo.png` and `a/photo.jpg` both map to `a/photo.jpg`: none of the
/// colliding derivatives is written, each becomes a failure.
#[derive(Debug, Default)]
pub struct DerivativePlan {
    pub unique: Vec<Derivative>,
    pub collisions: BTreeMap<RelativePath, Vec<Derivative>>,
}

impl DerivativePlan {
    pub fn new(entries: &[FileEntry]) -> Self {
        let mut by_target: BTreeMap<RelativePath, Vec<Derivative>> = BTreeMap::new();
        for derivative in entries.iter().flat_map(Derivative::all_for) {
            by_target
                .entry(derivative.target.clone())
                .or_default()
                .push(derivative);
        }

        let mut plan = Self::default();
        for (target, mut derivatives) in by_target {
            if derivatives.len() == 1 {
                plan.unique.extend(derivatives.pop());
            } else {
                derivatives.sort_by(|a, b| a.source.cmp(&b.source));
                plan.collisions.insert(target, derivatives);
            }
        }
        plan
    }

    /// Number of derivatives, written or not
    pub fn len(&self) -> usize {
        self.unique.len() + self.collisions.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Error recorded for every derivative of a colliding target
    pub fn collision_error(target: &RelativePath, derivatives: &[Derivative]) -> ConvertError {
        ConvertError::Collision {
            target: target.to_string(),
            sources: derivatives.iter().map(|d| d.source.to_string()).collect(),
        }
    }
}

/// Result of a successfully written derivative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeOutcome {
    pub target: PathBuf,
    pub source_width: u32,
    pub resized: bool,
    pub bytes_written: u64,
}

/// Produces derivatives with a `FileStore` and an `ImageCodec`
#[derive(Clone)]
pub struct Transcoder {
    store: Arc<dyn FileStore>,
    codec: Arc<dyn ImageCodec>,
    quality: u8,
    max_dimension: u32,
}

impl Transcoder {
    pub fn new(store: Arc<dyn FileStore>, codec: Arc<dyn ImageCodec>, config: &Config) -> Self {
        Self {
            store,
            codec,
            quality: config.quality,
            max_dimension: config.max_dimension,
        }
    }

    /// Produce both derivatives of `entry`, stopping at the first failure
    pub fn transcode(
        &self,
        source_root: &Path,
        output_root: &Path,
        entry: &FileEntry,
    ) -> Result<Vec<DerivativeOutcome>, ConvertError> {
        Derivative::all_for(entry)
            .iter()
            .map(|derivative| self.produce(source_root, output_root, derivative))
            .collect()
    }

    /// Produce a single derivative
    pub fn produce(
        &self,
        source_root: &Path,
        output_root: &Path,
        derivative: &Derivative,
    ) -> Result<DerivativeOutcome, ConvertError> {
        let source = derivative.source.path().to_path(source_root);
        let bytes = self
            .store
            .read_file(&source)
            .map_err(|e| ConvertError::io("read file", &source, e))?;

        let source_width = self
            .codec
            .read_width(&bytes)
            .map_err(|e| ConvertError::codec(&source, e))?;

        let resize_width = (source_width > self.max_dimension).then_some(self.max_dimension);
        let request = EncodeRequest {
            format: derivative.format,
            quality: self.quality,
            resize_width,
        };

        let encoded = self
            .codec
            .transcode(&bytes, &request)
            .map_err(|e| ConvertError::codec(&source, e))?;

        let target = derivative.target.to_path(output_root);
        self.store
            .write_file(&target, &encoded)
            .map_err(|e| ConvertError::io("write file", &target, e))?;

        debug!(
            "{} -> {} ({}, width {}{})",
            derivative.source,
            derivative.target,
            derivative.format,
            source_width,
            if resize_width.is_some() { ", resized" } else { "" }
        );

        Ok(DerivativeOutcome {
            target,
            source_width,
            resized: resize_width.is_some(),
            bytes_written: encoded.len() as u64,
        })
    }
}
