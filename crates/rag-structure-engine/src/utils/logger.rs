use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. When `directory` is set, a daily
/// rotating file layer (`structure.YYYY-MM-DD.log`) is added next to stdout.
/// Fails if a global subscriber is already installed.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let filter = EnvFilter::try_new(&log_level)?;

    let file_appender = match &config.directory {
        Some(dir) => Some(
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("structure")
                .filename_suffix("log")
                .build(dir)?,
        ),
        None => None,
    };

    match config.format {
        LogFormat::Json => {
            let file_layer = file_appender.map(|appender| {
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .with_level(true)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let file_layer = file_appender.map(|appender| {
                fmt::layer()
                    .with_writer(appender)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false) // No colors in file
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(false),
                )
                .with(file_layer)
                .try_init()?;
        }
    }

    Ok(())
}
