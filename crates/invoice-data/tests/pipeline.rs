use invoice_core::error::AggregationFailure;
use invoice_core::models::AggregateRow;
use invoice_data::{render_lines, InvoiceAggregator};

const SAMPLE_CSV: &str = "supplier_id,invoice_date,amount
SUP001,2024-01-05,100.00
SUP001,2024-01-10,200.00
SUP002,2024-01-15,300.50
SUP001,2024-02-01,50.00
";

#[test]
fn test_sample_groups_and_formats() {
    let report = InvoiceAggregator::aggregate(SAMPLE_CSV).expect("sample aggregates");
    assert_eq!(
        report.rows,
        vec![
            AggregateRow::new("SUP001", "2024-01", "300.00"),
            AggregateRow::new("SUP001", "2024-02", "50.00"),
            AggregateRow::new("SUP002", "2024-01", "300.50"),
        ]
    );
    assert_eq!(
        render_lines(&report.rows).unwrap(),
        "SUP001,2024-01,300.00\nSUP001,2024-02,50.00\nSUP002,2024-01,300.50\n"
    );
}

#[test]
fn test_aggregation_is_idempotent() {
    let first = InvoiceAggregator::aggregate(SAMPLE_CSV).unwrap();
    let second = InvoiceAggregator::aggregate(SAMPLE_CSV).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_gross_amount_column_is_used_when_present() {
    let csv = "supplier_id,invoice_date,gross_amount,amount\n\
               SUP001,2024-01-05,100.00,1\n\
               SUP001,2024-01-06,150.50,1\n";
    let report = InvoiceAggregator::aggregate(csv).unwrap();
    assert_eq!(report.rows, vec![AggregateRow::new("SUP001", "2024-01", "250.50")]);
}

#[test]
fn test_missing_supplier_column_gives_no_partial_result() {
    let csv = "invoice_date,amount\n2024-01-05,100.00\n";
    assert_eq!(
        InvoiceAggregator::aggregate(csv),
        Err(AggregationFailure::MissingColumns(vec!["supplier_id".to_string()]))
    );
}

#[test]
fn test_missing_date_column_gives_no_partial_result() {
    let csv = "supplier_id,amount\nSUP001,100.00\n";
    assert_eq!(
        InvoiceAggregator::aggregate(csv),
        Err(AggregationFailure::MissingColumns(vec!["invoice_date".to_string()]))
    );
}

#[test]
fn test_only_unparseable_dates() {
    let csv = "supplier_id,invoice_date,amount\nSUP001,31/31/2024,1\nSUP002,soon,2\n";
    assert_eq!(
        InvoiceAggregator::aggregate(csv),
        Err(AggregationFailure::NoValidDates)
    );
}

#[test]
fn test_many_small_amounts_do_not_drift() {
    let mut csv = String::from("supplier_id,invoice_date,amount\n");
    for _ in 0..1000 {
        csv.push_str("SUP001,2024-07-01,0.10\n");
    }
    let report = InvoiceAggregator::aggregate(&csv).unwrap();
    assert_eq!(report.rows, vec![AggregateRow::new("SUP001", "2024-07", "100.00")]);
}
