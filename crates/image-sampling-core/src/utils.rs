//! Utility functions and helpers

use std::path::{Path, PathBuf};
use std::time::Duration;

/// File naming utilities
pub mod file {
    use super::*;

    /// Base name of a path, lossily decoded
    pub fn base_name(path: &Path) -> Option<String> {
        path.file_name().map(|name| name.to_string_lossy().into_owned())
    }

    /// Whether the file is a derived output that must not be processed again
    pub fn has_skip_marker(path: &Path, prefix: &str) -> bool {
        base_name(path).is_some_and(|name| name.starts_with(prefix))
    }

    /// Name of the output derived from `source`
    pub fn output_file_name(source: &Path, prefix: &str) -> Option<String> {
        base_name(source).map(|name| format!("{}{}", prefix, name))
    }

    /// Directory that receives the output of `source`
    pub fn output_directory(source: &Path) -> PathBuf {
        match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Performance monitoring utilities
pub mod performance {
    use super::*;
    use std::time::Instant;

    /// Simple wall-clock timer
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                start: Instant::now(),
                name: name.into(),
            }
        }

        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }

        /// Whole seconds, truncated
        pub fn elapsed_secs(&self) -> u64 {
            self.elapsed().as_secs()
        }

        pub fn elapsed_ms(&self) -> u128 {
            self.elapsed().as_millis()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            tracing::debug!("Timer '{}' elapsed: {}ms", self.name, self.elapsed_ms());
        }
    }
}
