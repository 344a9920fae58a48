//! Clipvault CLI: run the video pipeline by hand against real tools and storage.
//!
//! Reads the same environment as the service (`STORAGE_BACKEND`, `S3_BUCKET`,
//! `FFPROBE_PATH`, ...). Output is JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipvault_cli::{init_tracing, print_json, ProbeReport};
use clipvault_core::Config;
use clipvault_processing::{FfprobeProber, Prober, ReferenceResolver, VideoPipeline};
use clipvault_storage::create_storage;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "clipvault", about = "Clipvault video pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dimensions, aspect label and orientation of a video file
    Probe {
        /// Path to the video file
        file: PathBuf,
    },
    /// Probe, remux and upload a local file; prints the durable reference
    Ingest {
        /// Path to the video file
        file: PathBuf,
        /// Content type stored with the object
        #[arg(long, default_value = "video/mp4")]
        content_type: String,
    },
    /// Print the delivery URL for an encoded `bucket,key` reference
    Resolve {
        /// Encoded storage reference
        reference: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Load configuration")?;
    init_tracing(config.is_production());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Probe { file } => {
            let prober = FfprobeProber::new(&config)?;
            let dimensions = prober.probe(&file, &cancel).await?;
            print_json(&ProbeReport::from(dimensions))?;
        }
        Commands::Ingest { file, content_type } => {
            config.validate()?;
            let storage = create_storage(&config).await?;
            let pipeline = VideoPipeline::from_config(&config, storage)?;
            let processed = pipeline.process_file(&file, &content_type, &cancel).await?;
            print_json(&serde_json::json!({
                "width": processed.dimensions.width,
                "height": processed.dimensions.height,
                "aspect_ratio": processed.aspect_ratio,
                "orientation": processed.orientation,
                "reference": processed.reference.encode(),
            }))?;
        }
        Commands::Resolve { reference } => {
            config.validate()?;
            let storage = create_storage(&config).await?;
            let resolver = ReferenceResolver::new(storage, &config);
            let url = resolver
                .resolve_reference(Some(&reference), &cancel)
                .await?;
            print_json(&serde_json::json!({ "url": url }))?;
        }
    }

    Ok(())
}
