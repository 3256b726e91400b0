//! Tracing setup shared by the worker, the library ingester, and the gateway.
//!
//! Every binary writes compact lines to stdout and appends to `logs/<component>.log`.
//! `WISDOM_LOG_FILE` redirects the file output of all binaries to one path. `RUST_LOG`
//! controls filtering and defaults to `info`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "logs";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber for `component`.
///
/// File logging is skipped, with a note on stderr, when the log file cannot be opened.
pub fn init_tracing(component: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_log_writer(&log_path(component)).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

fn log_path(component: &str) -> PathBuf {
    match std::env::var_os("WISDOM_LOG_FILE").filter(|value| !value.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => Path::new(LOG_DIR).join(format!("{component}.log")),
    }
}

fn open_log_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            // Dropping the guard would stop the writer thread; keep the first one forever.
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}
