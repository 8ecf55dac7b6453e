//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional daily-rolling NDJSON
//! file layer, and `RUST_LOG`-aware level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Console (stderr) plus the file, if a directory is set.
    Console,
    /// File only. Used by the TUI, where console output would tear the screen.
    FileOnly,
}

/// Initialize the global structured logger.
///
/// `level` is used only when `RUST_LOG` is unset. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_logger(log_dir: Option<PathBuf>, level: &str, json_console: bool, output: LogOutput) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Rolling file appender: writes NDJSON to `<dir>/mathmentor.log.YYYY-MM-DD`
    let file_layer = log_dir.map(|dir| {
        fmt::layer()
            .json()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, dir, "mathmentor.log"))
            .with_ansi(false)
    });

    let console = output == LogOutput::Console;
    let plain_console = (console && !json_console).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });
    let json_layer = (console && json_console).then(|| fmt::layer().json().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(plain_console)
        .with(json_layer)
        .try_init();
}
