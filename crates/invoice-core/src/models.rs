use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A report date that has passed validation.
///
/// Only [`crate::time_utils::parse_request_date`] can build one, so holding a
/// `DateRequest` proves the date lies inside the reporting year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateRequest(NaiveDate);

impl DateRequest {
    pub(crate) fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Which source column supplied the amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumn {
    GrossAmount,
    Amount,
}

impl AmountColumn {
    /// Header name as it appears in the CSV.
    pub fn header(&self) -> &'static str {
        match self {
            AmountColumn::GrossAmount => "gross_amount",
            AmountColumn::Amount => "amount",
        }
    }
}

/// One invoice line after parsing and normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRow {
    /// Opaque, non-empty supplier key.
    pub supplier_id: String,
    /// Parsed invoice date.
    pub invoice_date: NaiveDate,
    /// Canonical amount, whichever column it came from.
    pub gross_amount: Decimal,
}

/// One output line: the total for a supplier in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub supplier_id: String,
    /// `"YYYY-MM"`.
    pub invoice_month: String,
    /// Sum rendered with exactly two decimals.
    pub gross_amount: String,
}

impl AggregateRow {
    pub fn new(
        supplier_id: impl Into<String>,
        invoice_month: impl Into<String>,
        gross_amount: impl Into<String>,
    ) -> Self {
        Self {
            supplier_id: supplier_id.into(),
            invoice_month: invoice_month.into(),
            gross_amount: gross_amount.into(),
        }
    }
}

/// Aggregated rows plus the counters gathered while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    /// Sorted by supplier, then month.
    pub rows: Vec<AggregateRow>,
    /// Data records read from the CSV.
    pub rows_read: usize,
    /// Records that contributed to a total.
    pub rows_used: usize,
    /// Records dropped because the invoice date did not parse.
    pub invalid_dates: usize,
    /// Records dropped because the supplier cell was empty.
    pub missing_suppliers: usize,
    /// Column the amounts were taken from.
    pub amount_column: AmountColumn,
}
