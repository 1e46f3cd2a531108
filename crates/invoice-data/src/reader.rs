//! CSV ingestion for invoice exports.
//!
//! Turns the raw response body into [`RawInvoice`] records: checks the header
//! for the required columns, picks the amount column and parses amounts.
//! Invoice dates are left as text; the aggregator decides which ones survive.

use csv::{ReaderBuilder, StringRecord};
use invoice_core::error::AggregationFailure;
use invoice_core::formatting::parse_amount;
use invoice_core::models::AmountColumn;
use rust_decimal::Decimal;
use tracing::debug;

pub const SUPPLIER_ID: &str = "supplier_id";
pub const INVOICE_DATE: &str = "invoice_date";

// ── Public types ──────────────────────────────────────────────────────────────

/// One data record with the columns the report cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInvoice {
    /// 1-based line number in the source text.
    pub line: u64,
    pub supplier_id: String,
    /// Unparsed `invoice_date` cell.
    pub invoice_date: String,
    /// Canonical amount; `None` when the cell was empty.
    pub gross_amount: Option<Decimal>,
}

/// Parsed CSV body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTable {
    /// Column the amounts were read from.
    pub amount_column: AmountColumn,
    pub records: Vec<RawInvoice>,
}

/// Header positions of the columns in use.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    supplier_id: usize,
    invoice_date: usize,
    amount: usize,
    amount_column: AmountColumn,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse `csv_text` into invoice records.
///
/// Extra columns are ignored. A record with more fields than the header is a
/// parse error; a shorter one is padded with empty cells. Blank lines are
/// skipped.
pub fn read_invoices(csv_text: &str) -> Result<InvoiceTable, AggregationFailure> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| AggregationFailure::ParseError(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(AggregationFailure::ParseError(
            "No columns to parse from input".to_string(),
        ));
    }

    let layout = resolve_columns(&headers)?;
    debug!(
        "Using '{}' as the amount column",
        layout.amount_column.header()
    );

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| AggregationFailure::ParseError(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() > headers.len() {
            return Err(AggregationFailure::ParseError(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                record.len()
            )));
        }

        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let raw_amount = cell(layout.amount);
        let gross_amount = if raw_amount.trim().is_empty() {
            None
        } else {
            Some(
                parse_amount(raw_amount).ok_or_else(|| AggregationFailure::InvalidAmount {
                    line,
                    value: raw_amount.to_string(),
                })?,
            )
        };

        records.push(RawInvoice {
            line,
            supplier_id: cell(layout.supplier_id).to_string(),
            invoice_date: cell(layout.invoice_date).to_string(),
            gross_amount,
        });
    }

    Ok(InvoiceTable {
        amount_column: layout.amount_column,
        records,
    })
}

/// Decide which amount column to use from a header.
///
/// `gross_amount` wins over `amount`; `None` when neither is present.
pub fn determine_amount_column(headers: &StringRecord) -> Option<AmountColumn> {
    [AmountColumn::GrossAmount, AmountColumn::Amount]
        .into_iter()
        .find(|col| position(headers, col.header()).is_some())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn position(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnLayout, AggregationFailure> {
    let supplier_id = position(headers, SUPPLIER_ID);
    let invoice_date = position(headers, INVOICE_DATE);

    let (supplier_id, invoice_date) = match (supplier_id, invoice_date) {
        (Some(s), Some(d)) => (s, d),
        (s, d) => {
            let missing = [(SUPPLIER_ID, s), (INVOICE_DATE, d)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(AggregationFailure::MissingColumns(missing));
        }
    };

    let amount_column = determine_amount_column(headers).ok_or_else(|| {
        AggregationFailure::MissingColumns(vec!["amount|gross_amount".to_string()])
    })?;
    let amount = position(headers, amount_column.header()).unwrap_or_default();

    Ok(ColumnLayout {
        supplier_id,
        invoice_date,
        amount,
        amount_column,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
