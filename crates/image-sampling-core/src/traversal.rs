//! Concurrent recursive directory walk
//!
//! Each directory is enumerated once into its files and its child
//! directories. Files are handed to a [`FileHandler`]; child directories are
//! walked recursively. Both sets run at the same time and the call joins on
//! all of them before returning.
//!
//! File units share one semaphore for the whole walk, so at most
//! `max_concurrent_files` handlers run at once no matter how deep or wide
//! the tree is. Child directories are bounded per parent with
//! `buffer_unordered`; a tree-wide permit held across recursion would
//! deadlock once every permit belongs to a waiting parent.

use crate::config::{TraversalConfig, DEFAULT_MAX_CONCURRENCY};
use crate::error::{ProcessingError, Result};
use crate::models::{FileOutcome, RunSummary};
use crate::processing::FileHandler;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Immediate children of a directory, split by kind
#[derive(Debug, Default)]
struct DirectoryListing {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
}

/// Walks a tree and dispatches every file to a handler
pub struct DirectoryWalker {
    handler: Arc<dyn FileHandler>,
    file_permits: Arc<Semaphore>,
    max_concurrent_files: usize,
    max_concurrent_directories: usize,
}

impl DirectoryWalker {
    /// Create a walker with the default limits
    pub fn new(handler: Arc<dyn FileHandler>) -> Self {
        Self::build(handler, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_CONCURRENCY)
    }

    /// Create a walker with custom limits. Zero limits are rejected.
    pub fn with_config(handler: Arc<dyn FileHandler>, config: &TraversalConfig) -> Result<Self> {
        if config.max_concurrent_files == 0 || config.max_concurrent_directories == 0 {
            return Err(ProcessingError::ConfigError {
                message: "concurrency limits must be at least 1".to_string(),
            });
        }
        Ok(Self::build(
            handler,
            config.max_concurrent_files,
            config.max_concurrent_directories,
        ))
    }

    fn build(
        handler: Arc<dyn FileHandler>,
        max_concurrent_files: usize,
        max_concurrent_directories: usize,
    ) -> Self {
        Self {
            handler,
            file_permits: Arc::new(Semaphore::new(max_concurrent_files)),
            max_concurrent_files,
            max_concurrent_directories,
        }
    }

    /// Process `directory` and everything below it.
    ///
    /// A path that does not exist or is not a directory is a silent no-op
    /// and yields an empty summary. Relative roots are resolved against the
    /// working directory, so handlers always see absolute paths.
    #[instrument(skip(self), fields(handler = self.handler.name()))]
    pub async fn run(&self, directory: &Path) -> RunSummary {
        let summary = self.process(absolute_root(directory)).await;
        debug!(
            directories = summary.directories,
            files = summary.files_seen(),
            "Walk finished"
        );
        summary
    }

    fn process(&self, directory: PathBuf) -> BoxFuture<'_, RunSummary> {
        Box::pin(async move {
            match tokio::fs::metadata(&directory).await {
                Ok(metadata) if metadata.is_dir() => {}
                _ => return RunSummary::default(),
            }

            let listing = match list_directory(&directory).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(directory = %directory.display(), "Cannot enumerate directory: {}", e);
                    return RunSummary {
                        directories: 1,
                        unreadable_directories: 1,
                        ..Default::default()
                    };
                }
            };

            let (mut summary, children) = tokio::join!(
                self.process_files(listing.files),
                self.process_directories(listing.directories),
            );
            summary.directories += 1;
            summary += children;
            summary
        })
    }

    async fn process_files(&self, files: Vec<PathBuf>) -> RunSummary {
        let outcomes = stream::iter(files)
            .map(|path| async move {
                let outcome = match self.file_permits.acquire().await {
                    Ok(_permit) => self.handler.handle(&path).await,
                    Err(e) => FileOutcome::Failed {
                        message: e.to_string(),
                    },
                };
                (path, outcome)
            })
            .buffer_unordered(self.max_concurrent_files)
            .collect::<Vec<_>>()
            .await;

        let mut summary = RunSummary::default();
        for (path, outcome) in outcomes {
            summary.record(&path, outcome);
        }
        summary
    }

    async fn process_directories(&self, directories: Vec<PathBuf>) -> RunSummary {
        stream::iter(directories)
            .map(|directory| self.process(directory))
            .buffer_unordered(self.max_concurrent_directories)
            .fold(RunSummary::default(), |mut acc, child| async move {
                acc += child;
                acc
            })
            .await
    }
}

/// `directory` joined onto the working directory when relative. Falls back
/// to the path as given if the working directory is unavailable.
fn absolute_root(directory: &Path) -> PathBuf {
    if directory.is_absolute() {
        return directory.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(directory),
        Err(e) => {
            warn!("Cannot resolve working directory: {}", e);
            directory.to_path_buf()
        }
    }
}

/// Enumerate immediate children. Symlinks to files count as files;
/// symlinks to directories are not followed.
async fn list_directory(directory: &Path) -> Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();
    let mut entries = tokio::fs::read_dir(directory).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            listing.directories.push(path);
        } else if file_type.is_file() {
            listing.files.push(path);
        } else if file_type.is_symlink() {
            match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => listing.files.push(path),
                Ok(_) => debug!(path = %path.display(), "Not following directory symlink"),
                Err(e) => debug!(path = %path.display(), "Dangling symlink: {}", e),
            }
        }
    }

    Ok(listing)
}

impl std::fmt::Debug for DirectoryWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWalker")
            .field("handler", &self.handler.name())
            .field("max_concurrent_files", &self.max_concurrent_files)
            .field("max_concurrent_directories", &self.max_concurrent_directories)
            .finish_non_exhaustive()
    }
}
