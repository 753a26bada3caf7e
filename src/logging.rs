//! File logging. The terminal belongs to the TUI, so events go to a file.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "csle_console=info";

pub fn log_path() -> PathBuf {
    std::env::var("CSLE_CONSOLE_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("csle-console.log"))
}

/// Install the global subscriber. Filter directives come from `CSLE_CONSOLE_LOG`.
pub fn init() -> Result<PathBuf> {
    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {path:?}"))?;
    let filter =
        EnvFilter::try_from_env("CSLE_CONSOLE_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(path)
}
