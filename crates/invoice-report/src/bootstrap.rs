use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use invoice_core::settings::LogMode;
use invoice_core::FILE_ONLY_TARGET;
use tracing::Subscriber;
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Build the two-layer subscriber used by the binary.
///
/// - console layer: events at or above `mode`'s level, never the
///   [`FILE_ONLY_TARGET`] target.
/// - file layer: INFO and above from every target, appended to `log_file`.
///
/// Stdout is left alone; the report is the only thing written there.
pub fn build_subscriber<W>(
    mode: LogMode,
    console: W,
    log_file: &Path,
) -> anyhow::Result<impl Subscriber + Send + Sync + 'static>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let console_level = mode.console_level();
    let console_layer = fmt::layer()
        .with_writer(console)
        .with_target(true)
        .with_filter(filter_fn(move |meta| {
            meta.target() != FILE_ONLY_TARGET && *meta.level() <= console_level
        }));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::INFO);

    Ok(tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer))
}

/// Install the global subscriber, logging to stderr and `log_file`.
pub fn setup_logging(mode: LogMode, log_file: &Path) -> anyhow::Result<()> {
    build_subscriber(mode, std::io::stderr, log_file)?
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
