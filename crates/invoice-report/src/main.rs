mod bootstrap;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use invoice_core::settings::Settings;
use invoice_data::render_lines;
use invoice_runtime::fetcher::{Fetcher, RetryPolicy};
use invoice_runtime::orchestrator::ReportOrchestrator;

fn main() -> ExitCode {
    let settings = Settings::parse();

    if let Err(e) = bootstrap::setup_logging(settings.log_mode, &settings.log_file) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Invoice report v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(()) => {
            tracing::info!("Processing completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Produce the report for `settings.date` and write it to stdout.
///
/// The whole report is rendered before anything is written, so a failure
/// leaves stdout empty.
fn run(settings: &Settings) -> Result<()> {
    let config = settings.api_config()?;
    let fetcher = Fetcher::new(config, RetryPolicy::from(settings.retry_settings()))?;

    let report = ReportOrchestrator::new(fetcher).run(&settings.date)?;
    if report.missing_suppliers > 0 {
        tracing::warn!(
            "{} rows without supplier_id were ignored",
            report.missing_suppliers
        );
    }

    let output = render_lines(&report.rows)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write report to stdout")?;

    Ok(())
}
