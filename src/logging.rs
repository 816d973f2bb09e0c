use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber: human-readable lines on stderr (stdout
/// carries the enriched catalog) and a daily-rotated JSON file under
/// `config.directory`. `RUST_LOG` wins over `config.filter`.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(&config.directory) {
        eprintln!(
            "cannot create log directory {}: {e}",
            config.directory.display()
        );
    }

    let appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::constants::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    guard
}
