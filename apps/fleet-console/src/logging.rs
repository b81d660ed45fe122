//! Logging setup.
//!
//! The terminal belongs to the UI, so log lines go to a daily rolling file
//! under the data directory. `RUST_LOG` takes precedence over the configured
//! filter.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are written
    pub log_dir: PathBuf,
    /// Whether file logging is enabled at all
    pub enabled: bool,
    /// Default filter directives
    pub default_filter: String,
}

impl LoggingConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            log_dir: config.log_dir(),
            enabled: config.logging.file,
            default_filter: config.logging.filter.clone(),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize logging. The returned guard flushes the file writer on drop and
/// must be held until shutdown.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    if !config.enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "fleet-console.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(file_layer)
        .try_init()?;

    tracing::info!(log_dir = %config.log_dir.display(), "logging initialized");
    Ok(Some(guard))
}
