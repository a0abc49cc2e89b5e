#![cfg(feature = "std")]

use log::{self, LevelFilter, Metadata, Record};
use std::env;

/// Environment variable holding the log level (`error` … `trace`).
pub const LOG_ENV: &str = "HEATSEEKER_LOG";

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    // stdout is reserved for board and JSON output
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger with the level from `HEATSEEKER_LOG`, or
/// `fallback` when the variable is unset or invalid. Later calls are no-ops.
pub fn init_logging_with(fallback: LevelFilter) {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(fallback);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}

/// Initialize logging, defaulting to `info`.
pub fn init_logging() {
    init_logging_with(LevelFilter::Info);
}
