//! Error types for the image sampling library

use std::path::PathBuf;

/// Main error type for watermarking operations
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Font error: {message}")]
    Font { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Logging initialization failed: {message}")]
    LoggingError { message: String },

    #[error("Worker task failed: {message}")]
    TaskFailed { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl ProcessingError {
    /// Get the error type as a string for categorization
    pub fn error_type(&self) -> &'static str {
        match self {
            ProcessingError::Io(_) => "io_error",
            ProcessingError::Image(_) => "image_error",
            ProcessingError::Write { .. } => "write_error",
            ProcessingError::Font { .. } => "font_error",
            ProcessingError::ConfigError { .. } => "config_error",
            ProcessingError::LoggingError { .. } => "logging_error",
            ProcessingError::TaskFailed { .. } => "task_failed",
            ProcessingError::InvalidInput { .. } => "invalid_input",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProcessingError>;
