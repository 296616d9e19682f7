//! Logging initialization.
//!
//! Structured JSON logging to stdout, plus a daily log file when `LOG_DIR`
//! is set.

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system.
///
/// The log level comes from `RUST_LOG`; the default is
/// `info,homework_bot=debug`. When `LOG_DIR` is set, logs are also written
/// to a daily file `homework-bot.log.YYYY-MM-DD` under that directory, and
/// the returned `WorkerGuard` must be held in `main` so buffered lines are
/// flushed on exit.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,homework_bot=debug"));

    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true);

    let registry = tracing_subscriber::registry().with(filter).with(stdout_layer);

    match std::env::var("LOG_DIR") {
        Ok(log_dir) => {
            let file_appender = rolling::daily(&log_dir, "homework-bot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(non_blocking);

            registry.with(file_layer).try_init().ok();
            Some(guard)
        }
        Err(_) => {
            registry.try_init().ok();
            None
        }
    }
}
