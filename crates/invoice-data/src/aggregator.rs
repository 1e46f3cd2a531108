//! Supplier-by-month aggregation of invoice amounts.

use std::collections::BTreeMap;

use csv::{QuoteStyle, WriterBuilder};
use invoice_core::error::AggregationFailure;
use invoice_core::formatting::format_amount;
use invoice_core::models::{AggregateReport, AggregateRow, InvoiceRow};
use invoice_core::time_utils::{invoice_month, parse_invoice_date};
use invoice_core::FILE_ONLY_TARGET;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::reader::read_invoices;

// ── InvoiceAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that turns an invoice CSV into monthly supplier totals.
pub struct InvoiceAggregator;

impl InvoiceAggregator {
    /// Run the full pipeline over a CSV body.
    ///
    /// 1. Read records and resolve the amount column.
    /// 2. Drop records whose invoice date does not parse, counting them.
    /// 3. Drop records without a supplier, counting them.
    /// 4. Group by `(supplier_id, invoice_month)` and sum amounts.
    ///
    /// Fails with [`AggregationFailure::NoValidDates`] when step 2 leaves
    /// nothing behind.
    pub fn aggregate(csv_text: &str) -> Result<AggregateReport, AggregationFailure> {
        let table = read_invoices(csv_text)?;
        let rows_read = table.records.len();

        let mut invalid_dates = 0usize;
        let mut missing_suppliers = 0usize;
        let mut rows: Vec<InvoiceRow> = Vec::with_capacity(rows_read);

        for record in table.records {
            let Some(invoice_date) = parse_invoice_date(&record.invoice_date) else {
                invalid_dates += 1;
                continue;
            };
            if record.supplier_id.is_empty() {
                debug!("line {}: empty supplier_id, skipping", record.line);
                missing_suppliers += 1;
                continue;
            }
            rows.push(InvoiceRow {
                supplier_id: record.supplier_id,
                invoice_date,
                gross_amount: record.gross_amount.unwrap_or(Decimal::ZERO),
            });
        }

        if invalid_dates > 0 {
            warn!(
                target: FILE_ONLY_TARGET,
                "{} invoice_date rows could not be parsed and will be ignored", invalid_dates
            );
        }
        if invalid_dates == rows_read {
            return Err(AggregationFailure::NoValidDates);
        }

        let grouped = Self::aggregate_rows(&rows)?;
        info!(
            "Processed {} rows into {} grouped records",
            rows.len(),
            grouped.len()
        );

        Ok(AggregateReport {
            rows: grouped,
            rows_read,
            rows_used: rows.len(),
            invalid_dates,
            missing_suppliers,
            amount_column: table.amount_column,
        })
    }

    /// Group parsed rows by supplier and month.
    ///
    /// Returns one row per distinct pair, sorted by supplier then month, with
    /// sums formatted to two decimals. A total beyond the `Decimal` range is
    /// reported as [`AggregationFailure::Unexpected`].
    pub fn aggregate_rows(rows: &[InvoiceRow]) -> Result<Vec<AggregateRow>, AggregationFailure> {
        // BTreeMap keeps keys ordered by (supplier, month).
        let mut totals: BTreeMap<(String, String), Decimal> = BTreeMap::new();

        for row in rows {
            let month = invoice_month(row.invoice_date);
            let total = totals
                .entry((row.supplier_id.clone(), month.clone()))
                .or_insert(Decimal::ZERO);
            *total = total.checked_add(row.gross_amount).ok_or_else(|| {
                AggregationFailure::Unexpected(format!(
                    "amount overflow for {}/{}",
                    row.supplier_id, month
                ))
            })?;
        }

        Ok(totals
            .into_iter()
            .map(|((supplier_id, month), total)| {
                AggregateRow::new(supplier_id, month, format_amount(total))
            })
            .collect())
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render rows as `supplier_id,invoice_month,gross_amount` lines.
///
/// No header, no quoting, one trailing newline per row.
pub fn render_lines(rows: &[AggregateRow]) -> Result<String, AggregationFailure> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AggregationFailure::Unexpected(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AggregationFailure::Unexpected(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AggregationFailure::Unexpected(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
