use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "accuracy.log";
const DEFAULT_FILTER: &str = "accuracy_core=debug,info";

/// Install the global subscriber: human-readable lines on stderr plus JSON
/// lines in a daily-rolling file under `logs/`.
///
/// Stdout is left free for `forecast` output. The returned guard flushes the
/// file writer when dropped, so hold it for the life of the process.
pub fn init_logging() -> WorkerGuard {
    // Without the directory the appender silently drops everything
    let _ = fs::create_dir_all(LOG_DIR);

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    guard
}
