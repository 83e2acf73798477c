//! Per-file processing: skip marker, classification and the isolating
//! boundary around the watermark engine

use crate::config::{WatermarkStyle, OUTPUT_PREFIX};
use crate::error::{ProcessingError, Result};
use crate::models::{FileKind, FileOutcome};
use crate::utils::file;
use crate::watermark_engine::WatermarkEngine;
use std::path::Path;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

/// Unit of work the directory walker dispatches for every file it finds
#[async_trait::async_trait]
pub trait FileHandler: Send + Sync {
    /// Process one file. Never fails: problems are reported in the outcome.
    async fn handle(&self, path: &Path) -> FileOutcome;

    /// Get the name of this handler
    fn name(&self) -> &'static str;
}

/// Writes a watermarked PNG copy next to every image it is handed
#[derive(Debug, Clone)]
pub struct WatermarkProcessor {
    engine: Arc<WatermarkEngine>,
    output_prefix: String,
}

impl WatermarkProcessor {
    /// Create a processor with the default style and output prefix
    pub fn new() -> Result<Self> {
        Ok(Self::with_engine(WatermarkEngine::new()?, OUTPUT_PREFIX))
    }

    pub fn with_style(style: WatermarkStyle, output_prefix: impl Into<String>) -> Result<Self> {
        Ok(Self::with_engine(WatermarkEngine::with_style(style)?, output_prefix))
    }

    pub fn with_engine(engine: WatermarkEngine, output_prefix: impl Into<String>) -> Self {
        Self {
            engine: Arc::new(engine),
            output_prefix: output_prefix.into(),
        }
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    async fn watermark(&self, path: &Path) -> Result<FileOutcome> {
        if !FileKind::from_path(path).is_image() {
            return Ok(FileOutcome::Ignored);
        }

        let dest_name =
            file::output_file_name(path, &self.output_prefix).ok_or_else(|| {
                ProcessingError::InvalidInput {
                    message: format!("{} has no file name", path.display()),
                }
            })?;
        let dest_dir = file::output_directory(path);
        let source = path.to_path_buf();
        let engine = Arc::clone(&self.engine);

        let output = task::spawn_blocking(move || {
            engine.watermark_file(&source, &dest_dir, &dest_name)
        })
        .await
        .map_err(|e| ProcessingError::TaskFailed {
            message: e.to_string(),
        })??;

        Ok(FileOutcome::Watermarked { output })
    }
}

#[async_trait::async_trait]
impl FileHandler for WatermarkProcessor {
    async fn handle(&self, path: &Path) -> FileOutcome {
        if file::has_skip_marker(path, &self.output_prefix) {
            return FileOutcome::Skipped;
        }

        println!("Processing - {}", path.display());

        match self.watermark(path).await {
            Ok(outcome) => {
                debug!(path = %path.display(), ?outcome, "File handled");
                outcome
            }
            Err(e) => {
                println!("An unknown error occurred - {}.", e);
                warn!(
                    path = %path.display(),
                    error_type = e.error_type(),
                    "Watermarking failed: {}",
                    e
                );
                FileOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "watermark"
    }
}
