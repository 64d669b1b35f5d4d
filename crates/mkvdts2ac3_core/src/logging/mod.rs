//! Per-file conversion logging.
//!
//! Terminal output goes through `tracing`; the [`JobLog`] additionally
//! records a transcript of each container's conversion (phases, executed
//! commands, warnings) to a log file when file logging is enabled.

mod job_log;
mod types;

pub use job_log::JobLog;
pub use types::{LogConfig, MessagePrefix};

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set, falling back to the provided default
/// filter otherwise. When `log_dir` is given, events are additionally
/// appended to `mkvdts2ac3.log` in that directory; the returned guard must
/// stay alive until shutdown or buffered lines are lost. Should be called
/// once at startup.
pub fn init_tracing(default_filter: &str, ansi: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let terminal = fmt::layer().with_target(false).with_ansi(ansi);

    let file_writer = log_dir.and_then(|dir| {
        fs::create_dir_all(dir).ok()?;
        let appender = tracing_appender::rolling::never(dir, "mkvdts2ac3.log");
        Some(tracing_appender::non_blocking(appender))
    });

    match file_writer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(terminal)
                .with(fmt::layer().with_target(false).with_ansi(false).with_writer(writer))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(terminal)
                .with(filter)
                .init();
            None
        }
    }
}
