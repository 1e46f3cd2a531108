//! Runtime layer for the invoice report.
//!
//! Owns network access and ties validation, fetching and aggregation into a
//! single run.

pub mod fetcher;
pub mod orchestrator;

pub use invoice_core as core;
pub use invoice_data as data;
