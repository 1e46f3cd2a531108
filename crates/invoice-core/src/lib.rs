//! Domain types and shared helpers for the invoice report.
//!
//! Holds the error taxonomy, request-date validation, lenient invoice-date
//! parsing, amount formatting and command-line settings used by the data,
//! runtime and binary crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

/// Tracing target for diagnostics that belong in the log file only.
///
/// The console layer installed by the binary drops events on this target.
pub const FILE_ONLY_TARGET: &str = "invoice::file_only";
