//! Logging setup for the binary.
//!
//! Library code logs through the `log` facade; this module installs a
//! `tracing` subscriber and forwards `log` records into it. Human-readable
//! output goes to stderr so stdout stays clean for JSON records.

use std::fs;
use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ImporterConfig;

/// Initialize logging. The returned guard must be held for the lifetime of
/// the program when file logging is enabled, or buffered lines are lost.
pub fn init(config: &ImporterConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let (file_layer, guard) = if config.logging.log_to_file {
        let log_dir = config.log_dir();
        if !log_dir.exists() {
            if let Err(e) = fs::create_dir_all(&log_dir) {
                eprintln!("Failed to create logs directory: {}", e);
            }
        }

        let file_appender = tracing_appender::rolling::daily(&log_dir, "statblock-import.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // JSON format for easy parsing
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_filter(env_filter.clone());

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .compact()
        .with_filter(env_filter);

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
        return guard;
    }

    // Redirect standard `log` macros to `tracing`. The subscriber may already
    // have installed the bridge.
    if let Err(e) = tracing_log::LogTracer::init() {
        log::debug!("LogTracer already installed: {}", e);
    }

    log::debug!(
        "Logging initialized (level: {}, file: {})",
        config.logging.level,
        config.logging.log_to_file
    );

    guard
}
