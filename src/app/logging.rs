//! Usage: Process-wide tracing setup (console + optional daily-rolling file).
//!
//! `log` records from reqwest/hyper are bridged by tracing-subscriber's `tracing-log`
//! integration when the global subscriber is installed.

use crate::shared::error::{AppError, AppResult};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_FILE_PREFIX: &str = "chronos-auth.log";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Enables the file layer when set.
    pub log_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            log_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber. Keep the returned guard alive for the process lifetime
/// or buffered file lines are lost. A second call leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::new("SYSTEM_ERROR", "failed to create log dir").with_source(e)
            })?;
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    if let Err(err) = installed {
        tracing::debug!(error = %err, "tracing subscriber already installed");
        return Ok(None);
    }
    Ok(guard)
}
