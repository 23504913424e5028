use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ipl_win_predictor=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// File logging for the terminal UI, which owns stdout.
pub fn init_file_logging(dir: &Path, file_name: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Minimal stderr logging for one-shot commands.
pub fn init_stderr_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
