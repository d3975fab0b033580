//! Logging setup
//!
//! Logs go to stderr, or to `log_file` when one is configured. The filter
//! comes from WEAVE_LOG when set, otherwise from the `-v` count.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a full `EnvFilter` directive
const LOG_ENV: &str = "WEAVE_LOG";

/// Initialize the global tracing subscriber
///
/// Ignores the error if a subscriber is already installed.
pub fn init(verbosity: u8, log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = level_for(verbosity);
        EnvFilter::new(format!("weave_core={},weave_cli={}", level, level))
    });

    let Some(log_path) = log_file else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();

    info!("Logging to {:?}", log_path);
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
