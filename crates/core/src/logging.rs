use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default log directory: `$HOME/.rescope/logs`
pub fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".rescope/logs")
}

/// Install a global subscriber writing to a daily-rolling file in `log_dir`,
/// and optionally to stderr.
///
/// Returns `None` when a global subscriber is already installed; the guard
/// must be kept alive for buffered file output to be flushed.
pub fn init_logging(component: &str, log_dir: &Path, to_stderr: bool) -> Option<WorkerGuard> {
    let _ = std::fs::create_dir_all(log_dir);

    // Files are named after the component, e.g. locator.2024-01-21
    let file_appender = tracing_appender::rolling::daily(log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let installed = if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        registry.with(stderr_layer).try_init().is_ok()
    } else {
        registry.try_init().is_ok()
    };

    installed.then_some(guard)
}
