//! Data models for the watermarking pipeline

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

/// Extensions treated as images, compared case-insensitively with the dot
pub const IMAGE_EXTENSIONS: [&str; 5] = [".JPG", ".JPE", ".BMP", ".GIF", ".PNG"];

/// Kind of a file as inferred from its name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Image,
    Other,
}

impl FileKind {
    /// Classify a path by extension. Content is never inspected.
    pub fn from_path(path: &Path) -> Self {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return FileKind::Other;
        };
        let dotted = format!(".{}", extension.to_uppercase());
        if IMAGE_EXTENSIONS.contains(&dotted.as_str()) {
            FileKind::Image
        } else {
            FileKind::Other
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, FileKind::Image)
    }
}

/// Result of handing one file to a processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Name carries the output prefix; nothing was read
    Skipped,
    /// Not an image by extension
    Ignored,
    Watermarked { output: PathBuf },
    Failed { message: String },
}

/// A file whose processing failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregate of every outcome below a directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub directories: usize,
    pub unreadable_directories: usize,
    pub watermarked: usize,
    pub ignored: usize,
    pub skipped: usize,
    pub failures: Vec<FailedFile>,
}

impl RunSummary {
    /// Fold one file outcome into the summary
    pub fn record(&mut self, path: &Path, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Ignored => self.ignored += 1,
            FileOutcome::Watermarked { .. } => self.watermarked += 1,
            FileOutcome::Failed { message } => self.failures.push(FailedFile {
                path: path.to_path_buf(),
                message,
            }),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of files handed to a processor
    pub fn files_seen(&self) -> usize {
        self.watermarked + self.ignored + self.skipped + self.failed()
    }
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.directories += other.directories;
        self.unreadable_directories += other.unreadable_directories;
        self.watermarked += other.watermarked;
        self.ignored += other.ignored;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}
