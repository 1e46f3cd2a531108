//! End-to-end report pipeline.
//!
//! Chains date validation, fetching and aggregation. Each stage returns an
//! explicit result; the first failure ends the run and nothing is produced.

use invoice_core::error::{AggregationFailure, DateError, FetchFailure};
use invoice_core::models::{AggregateReport, DateRequest};
use invoice_core::time_utils::parse_request_date;
use invoice_data::InvoiceAggregator;
use thiserror::Error;
use tracing::info;

use crate::fetcher::Fetcher;

// ── Public types ──────────────────────────────────────────────────────────────

/// Where invoice CSV comes from.
pub trait InvoiceSource {
    fn fetch(&self, date: &DateRequest) -> Result<String, FetchFailure>;
}

impl InvoiceSource for Fetcher {
    fn fetch(&self, date: &DateRequest) -> Result<String, FetchFailure> {
        Fetcher::fetch(self, date)
    }
}

/// Failure of any pipeline stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error("Failed to fetch invoice data")]
    Fetch(#[from] FetchFailure),

    #[error("Failed to process invoice data")]
    Aggregation(#[from] AggregationFailure),
}

// ── ReportOrchestrator ────────────────────────────────────────────────────────

/// Runs one report for one date.
pub struct ReportOrchestrator<S> {
    source: S,
}

impl<S: InvoiceSource> ReportOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Validate `date_str`, fetch its invoices and aggregate them.
    ///
    /// An invalid date is rejected before the source is contacted.
    pub fn run(&self, date_str: &str) -> Result<AggregateReport, ReportError> {
        let date = parse_request_date(date_str)?;

        let csv_text = self.source.fetch(&date)?;

        info!("Processing invoice data...");
        let report = InvoiceAggregator::aggregate(&csv_text)?;
        info!("Outputting {} grouped invoice records...", report.rows.len());

        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
