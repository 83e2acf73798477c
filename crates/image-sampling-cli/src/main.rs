//! Command-line interface for image sampling

use anyhow::Result;
use clap::Parser;
use image_sampling_core::utils::performance::Timer;
use image_sampling_core::{init, version, watermark_tree, AppConfig};
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "Use this via command line, image-sampling [directory to images]";

#[derive(Parser)]
#[command(name = "image-sampling")]
#[command(about = "Write a watermarked PNG copy next to every image in a directory tree")]
#[command(version = version())]
struct Cli {
    /// Directory to scan recursively
    directory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(directory) = cli.directory else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = AppConfig::default();
    init(&config)?;
    info!("Image Sampling v{} starting on {}", version(), directory.display());

    let timer = Timer::new("watermark_tree");
    let summary = watermark_tree(&directory, &config).await?;

    info!(
        directories = summary.directories,
        watermarked = summary.watermarked,
        ignored = summary.ignored,
        skipped = summary.skipped,
        failed = summary.failed(),
        "Run finished"
    );
    println!("Completed - {} second(s).", timer.elapsed_secs());

    Ok(())
}
