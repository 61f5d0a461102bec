use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: console output plus a size-capped log file.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process logs.
pub fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json = config.format == "json";
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console {
        if json {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .boxed(),
            );
        } else {
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .boxed(),
            );
        }
    }

    let (writer, guard) = tracing_appender::non_blocking(file_appender(config)?);

    let file_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };
    layers.push(file_layer);

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Live log file; backups sit next to it as `<name>.1` .. `<name>.<max_files>`
fn log_file_path(config: &LoggingConfig) -> PathBuf {
    config.directory.join(&config.file_name)
}

fn file_appender(config: &LoggingConfig) -> Result<BasicRollingFileAppender> {
    std::fs::create_dir_all(&config.directory)
        .context(format!("Failed to create log directory: {}", config.directory.display()))?;

    let path = log_file_path(config);
    BasicRollingFileAppender::new(&path, rolling_condition(config), config.max_files)
        .context(format!("Failed to open log file: {}", path.display()))
}

fn rolling_condition(config: &LoggingConfig) -> RollingConditionBasic {
    let condition = RollingConditionBasic::new().max_size(config.max_size_bytes);

    match config.rotation.as_str() {
        "hourly" => condition.hourly(),
        "daily" => condition.daily(),
        _ => condition,
    }
}
