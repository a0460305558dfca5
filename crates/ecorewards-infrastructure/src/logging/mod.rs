//! Logging bootstrap.
//!
//! Human-readable output on stdout filtered by `RUST_LOG`, plus an
//! optional one-line-JSON file layer with daily rotation. Safe to call
//! more than once; only the first call wins.

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init_logger(log_dir: Option<PathBuf>) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    // Forward log-crate macros into tracing.
    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_filter(env_filter);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let file_appender = rolling::daily(&dir, "ecorewards.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = FILE_GUARD.set(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    let _ = LOGGER_READY.set(());
    Ok(())
}
