//! Logging setup for the codeatlas binary.
//!
//! Library code only emits `tracing` events; this module wires a subscriber
//! with an stderr layer and an optional rolling file layer.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

const DEFAULT_DIRECTIVE: &str = "codeatlas=info";

/// Keeps the non-blocking writers alive; pending log lines are flushed when
/// it is dropped.
#[must_use = "Dropping this guard will stop logging - keep it alive for the program's lifetime"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    _stderr_guard: Option<WorkerGuard>,
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialize the global subscriber from configuration.
pub fn init_logging(config: &LoggingConfig, repo_root: &Path) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer<Registry>> = Vec::new();
    let mut file_guard = None;
    let mut stderr_guard = None;

    if config.enabled {
        let (layer, guard) = file_layer(config, repo_root)?;
        layers.push(layer);
        file_guard = Some(guard);
    }

    if config.stderr {
        let (layer, guard) = stderr_layer();
        layers.push(layer);
        stderr_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to initialize logging subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        _stderr_guard: stderr_guard,
    })
}

fn file_layer<S>(config: &LoggingConfig, repo_root: &Path) -> Result<(BoxedLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let log_dir = resolve_log_dir(&config.directory, repo_root);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let appender =
        RollingFileAppender::new(parse_rotation(&config.rotation), &log_dir, &config.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(parse_level(&config.level))
        .boxed();

    Ok((layer, guard))
}

fn stderr_layer<S>() -> (BoxedLayer<S>, WorkerGuard)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_filter(filter)
        .boxed();

    (layer, guard)
}

fn resolve_log_dir(directory: &Path, repo_root: &Path) -> PathBuf {
    if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        repo_root.join(directory)
    }
}

fn parse_level(level: &str) -> EnvFilter {
    let directive = match level.to_lowercase().as_str() {
        lvl @ ("trace" | "debug" | "info" | "warn" | "error") => format!("codeatlas={}", lvl),
        _ => {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
            DEFAULT_DIRECTIVE.to_string()
        }
    };
    EnvFilter::new(directive)
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        _ => {
            eprintln!(
                "Warning: Unknown rotation strategy '{}', defaulting to 'daily'",
                rotation
            );
            Rotation::DAILY
        }
    }
}
