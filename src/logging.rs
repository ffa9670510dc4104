use crate::models::LogFormat;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Where and how log records are written.
#[derive(Debug, Clone, Copy)]
pub struct LogTarget<'a> {
    /// Directory for the daily files; created if missing
    pub dir: &'a Utf8Path,
    /// File name prefix, e.g. "kanalearn" → `kanalearn.2024-05-01`
    pub file_prefix: &'a str,
    pub format: LogFormat,
    /// Debug level instead of info
    pub verbose: bool,
    /// Also echo records to stderr; stdout belongs to the shell
    pub echo_to_stderr: bool,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the level chosen by `verbose`. Fails when a global
/// subscriber is already installed.
///
/// # Returns
/// The file writer's guard; buffered records are flushed when it is dropped,
/// so hold it until the program exits
pub fn init_logging(target: &LogTarget<'_>) -> Result<WorkerGuard> {
    fs::create_dir_all(target.dir)
        .with_context(|| format!("Failed to create log directory: {}", target.dir))?;

    let appender = tracing_appender::rolling::daily(target.dir, target.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let stderr_layer = target.echo_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(level_filter(target.verbose))
        .with(file_layer(writer, target.format))
        .with(stderr_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(
        dir = %target.dir,
        format = ?target.format,
        verbose = target.verbose,
        "Logging started"
    );
    Ok(guard)
}

fn file_layer<S>(writer: NonBlocking, format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_line_number(true);

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().with_current_span(false).boxed(),
    }
}

fn level_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}
