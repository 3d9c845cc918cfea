//! # Pipeline Module
//!
//! Modulo che separa le responsabilità della conversione in sottomoduli:
//! - `orchestrator`: Macchina a stati della run
//! - `collector`: Discovery ricorsiva delle immagini
//! - `mirror`: Replica della struttura directory
//! - `transcoder`: Worker per i derivati di un singolo file
//! - `progress_tracker`: Progress bar, eventi JSON e report
//! - `path_resolver`: Path relativi e calcolo path di output

pub mod collector;
pub mod mirror;
pub mod orchestrator;
pub mod path_resolver;
pub mod progress_tracker;
pub mod transcoder;

pub use collector::PathCollector;
pub use mirror::DirectoryMirror;
pub use orchestrator::{Pipeline, Stage};
pub use path_resolver::{FileEntry, RelativePath};
pub use progress_tracker::ProgressTracker;
pub use transcoder::{Derivative, DerivativeOutcome, DerivativePlan, Transcoder};
