//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `<data dir>/wellness/wellness.log` with 10 MB size-based
//! rotation. The REPL owns stdout, so the console layer writes to stderr and
//! only shows warnings unless `DEBUG_LOGGING=1` is set.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,wellness_core=debug,wellness_cli=debug";

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the program lifetime so
/// buffered log lines are flushed on shutdown. Falls back to stderr-only
/// logging (returning `None`) when the log file can't be opened.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::data_dir() {
        Some(data) => data.join("wellness"),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber isn't up yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("wellness.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1, // wellness.log and wellness.log.1
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(filter(debug_logging));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "Wellness logging initialized");

    Some(guard)
}

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging { DEBUG_DIRECTIVE } else { "info" })
}

fn stderr_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let directive = if debug_logging { DEBUG_DIRECTIVE } else { "warn" };
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(directive))
}

fn init_stderr_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(stderr_layer(debug_logging))
        .init();

    tracing::info!(debug_logging, "Wellness logging initialized (stderr only)");
}
