//! Log setup: a daily rolling file under the config directory's `logs/`.
//!
//! Nothing goes to the terminal so log lines never interleave with the REPL.

use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_FILE_PREFIX: &str = "juris.log";

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// The returned guard flushes buffered lines when dropped; keep it alive for
/// the whole run.
pub fn init(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("Logging initialized in {}", logs_dir.display());
    Ok(guard)
}
