//! Logging configuration and initialization

use crate::config::LoggingConfig;
use crate::error::{ProcessingError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Diagnostics go to stderr so that stdout only carries the console lines
/// (`Processing - ...`, `Completed - ...`). `RUST_LOG` wins over the
/// configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
    {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_msg = e.to_string();
            // A subscriber from an earlier call (or a test harness) is fine
            if error_msg.contains("already been set") {
                Ok(())
            } else {
                Err(ProcessingError::LoggingError {
                    message: format!("Failed to initialize logging: {}", e),
                })
            }
        }
    }
}
