//! Configuration for the watermarking pipeline
//!
//! Every cosmetic constant of the watermark and every concurrency limit of
//! the walk lives here, so library callers and tests can override them
//! without touching the algorithm. The CLI always runs with the defaults.

use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text stamped onto every image
pub const WATERMARK_TEXT: &str = "Sample Image © 1st Safari Day Nurseries Ltd";

/// Filename prefix of derived outputs, doubling as the skip marker
pub const OUTPUT_PREFIX: &str = "watermark-";

/// Glyph height in pixels
pub const DEFAULT_FONT_SIZE: f32 = 60.0;

/// DimGray
pub const DEFAULT_TEXT_COLOR: [u8; 3] = [105, 105, 105];

/// Brush alpha out of 255
pub const DEFAULT_TEXT_ALPHA: u8 = 110;

/// Gap between the text and the bottom-right image corner
pub const DEFAULT_INSET: u32 = 10;

/// In-flight limit for both file units and child directories
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub watermark: WatermarkStyle,
    pub traversal: TraversalConfig,
    pub logging: LoggingConfig,
}

/// Appearance of the stamped text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_size: f32,
    pub color: [u8; 3],
    pub alpha: u8,
    pub inset: u32,
    /// TrueType/OpenType file to use instead of the embedded bold font
    pub font_path: Option<PathBuf>,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: WATERMARK_TEXT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR,
            alpha: DEFAULT_TEXT_ALPHA,
            inset: DEFAULT_INSET,
            font_path: None,
        }
    }
}

/// Limits and naming used by the directory walk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraversalConfig {
    /// Upper bound on file units in flight across the whole walk
    pub max_concurrent_files: usize,
    /// Upper bound on child directories in flight per directory
    pub max_concurrent_directories: usize,
    pub output_prefix: String,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: DEFAULT_MAX_CONCURRENCY,
            max_concurrent_directories: DEFAULT_MAX_CONCURRENCY,
            output_prefix: OUTPUT_PREFIX.to_string(),
        }
    }
}

/// Diagnostic logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| ProcessingError::ConfigError {
                message: format!("Failed to parse config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProcessingError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.traversal.max_concurrent_files == 0 || self.traversal.max_concurrent_directories == 0
        {
            return Err(ProcessingError::ConfigError {
                message: "concurrency limits must be at least 1".to_string(),
            });
        }
        if self.traversal.output_prefix.is_empty() {
            return Err(ProcessingError::ConfigError {
                message: "output prefix must not be empty".to_string(),
            });
        }
        if !(self.watermark.font_size > 0.0) {
            return Err(ProcessingError::ConfigError {
                message: format!("font size must be positive, got {}", self.watermark.font_size),
            });
        }
        Ok(())
    }
}
