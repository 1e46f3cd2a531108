//! CSV ingestion and aggregation for the invoice report.
//!
//! Reads invoice exports, normalises the amount column, parses invoice dates
//! leniently and produces per-supplier monthly totals.

pub mod aggregator;
pub mod reader;

pub use aggregator::{render_lines, InvoiceAggregator};
pub use invoice_core as core;
