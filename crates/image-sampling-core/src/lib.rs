//! # Image Sampling Core
//!
//! Walks a directory tree and writes a watermarked PNG copy next to every
//! image it finds, named with the `watermark-` prefix. Originals are never
//! modified and prefixed files are never processed again.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod processing;
pub mod traversal;
pub mod utils;
pub mod watermark_engine;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use logging::*;
pub use models::*;
pub use processing::{FileHandler, WatermarkProcessor};
pub use traversal::DirectoryWalker;
pub use watermark_engine::{PositionCalculator, WatermarkEngine};

use std::path::Path;
use std::sync::Arc;

/// Initialize the image sampling core library
pub fn init(config: &AppConfig) -> Result<()> {
    logging::init_logging(&config.logging)?;

    tracing::debug!("Image Sampling Core initialized");
    Ok(())
}

/// Watermark every image below `root` using `config`.
///
/// Blocks (asynchronously) until the whole tree has been processed.
pub async fn watermark_tree(root: &Path, config: &AppConfig) -> Result<RunSummary> {
    config.validate()?;
    let processor = WatermarkProcessor::with_style(
        config.watermark.clone(),
        config.traversal.output_prefix.clone(),
    )?;
    let walker = DirectoryWalker::with_config(Arc::new(processor), &config.traversal)?;
    Ok(walker.run(root).await)
}

/// Get the version of the image sampling core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
