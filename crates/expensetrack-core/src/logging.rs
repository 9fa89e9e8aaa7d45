//! File logging. Output goes to `${EXPENSETRACK_HOME}/logs/` so that
//! stdout stays reserved for command output.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Environment variable that overrides `logging.level`.
pub const LOG_ENV: &str = "EXPENSETRACK_LOG";

const LOG_FILE_PREFIX: &str = "expensetrack.log";

/// Installs the global subscriber writing to a daily-rolling file in `dir`.
///
/// Keep the returned guard alive until exit; dropping it flushes the writer.
///
/// # Errors
/// Returns an error if the directory cannot be created, the filter is
/// invalid, or a subscriber is already installed.
pub fn init(config: &LoggingConfig, dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), &config.level)?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(guard)
}

/// Env directive wins over the configured level.
fn build_filter(env: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directives = env
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(level);
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{directives}'"))
}
