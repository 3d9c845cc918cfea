//! # Image Dist - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione della directory sorgente
//! - Creazione della configurazione e avvio della pipeline
//! - Exit code non-zero se la run abortisce o un derivato fallisce
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (sorgente, output, json, verbose)
//! 2. Configura il logging su stderr (INFO o DEBUG, override con `RUST_LOG`)
//! 3. Valida che la directory sorgente esista
//! 4. Crea la `Config` e avvia la `Pipeline`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-dist                      # src -> dist
//! image-dist photos public/img --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use image_dist::{json_output::JsonMessage, Config, Pipeline};

#[derive(Parser)]
#[command(name = "image-dist")]
#[command(about = "Mirror an image tree into resized JPEG and WebP derivatives")]
struct Args {
    /// Directory containing the source images
    #[arg(default_value = "src")]
    source_directory: PathBuf,

    /// Output directory, removed and recreated on every run
    #[arg(default_value = "dist")]
    output_directory: PathBuf,

    /// Emit progress and results as JSON lines on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.source_directory.is_dir() {
        let message = format!(
            "Source directory does not exist: {}",
            args.source_directory.display()
        );
        if args.json {
            JsonMessage::error(message.clone(), None).emit();
        }
        return Err(anyhow::anyhow!(message));
    }

    let config = Config::new(args.source_directory, args.output_directory).with_json_output(args.json);

    let report = match Pipeline::new(config)?.run().await {
        Ok(report) => report,
        Err(e) => {
            if args.json {
                JsonMessage::error("Conversion aborted".to_string(), Some(e.to_string())).emit();
            }
            return Err(e.into());
        }
    };

    if !report.is_success() {
        return Err(anyhow::anyhow!(
            "{} of {} derivatives failed",
            report.failures.len(),
            report.derivatives_expected()
        ));
    }

    Ok(())
}
