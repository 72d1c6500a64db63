use chrono::NaiveDate;
use cohortlab_core::{
    error::AnalysisError,
    loader::load_transactions,
    quality::SkipReason,
    record::OrderStatus,
};
use std::io::Write;
use tempfile::NamedTempFile;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Headers are normalized (trim, case, spaces) and the export's column
/// names resolve through their aliases.
#[test]
fn messy_headers_resolve_through_aliases() {
    let file = csv_file(&[
        "Order ID,Cust ID,Order Date,Total,Category,Payment Method,Region,Status",
        "o1,A,2024-01-05,100.50,apparel,card,north,Completed",
        "o2,B,2024-01-09,60,grocery,cod,south,completed",
    ]);

    let outcome = load_transactions(file.path()).unwrap();

    assert_eq!(outcome.dataset.len(), 2);
    assert!(outcome.quality.is_clean());

    let first = &outcome.dataset.transactions[0];
    assert_eq!(first.customer_id, "A");
    assert_eq!(first.order_id, "o1");
    assert_eq!(first.order_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(first.revenue_amount, 100.5);
    assert_eq!(first.status, OrderStatus::Completed);
}

/// Day-first dates parse the way the export writes them: 01/10/2020 is
/// the first of October.
#[test]
fn day_first_dates_parse() {
    let file = csv_file(&[
        "order_id,customer_id,order_date,total",
        "o1,A,01/10/2020,10",
        "o2,A,13/11/2020,20",
    ]);

    let outcome = load_transactions(file.path()).unwrap();

    assert_eq!(
        outcome.dataset.transactions[0].order_date,
        NaiveDate::from_ymd_opt(2020, 10, 1).unwrap()
    );
    assert_eq!(
        outcome.dataset.transactions[1].order_date,
        NaiveDate::from_ymd_opt(2020, 11, 13).unwrap()
    );
}

/// Bad rows are skipped and counted per reason; good rows still load.
#[test]
fn bad_rows_are_skipped_and_counted() {
    let file = csv_file(&[
        "order_id,customer_id,order_date,total,status",
        "o1,A,2024-01-05,100,completed",
        "o2,B,not-a-date,50,completed",
        "o3,C,2024-01-07,fifty,completed",
        "o4,,2024-01-08,70,completed",
        ",D,2024-01-09,80,completed",
        "o6,E,2024-01-10,90,teleported",
    ]);

    let outcome = load_transactions(file.path()).unwrap();

    assert_eq!(outcome.dataset.len(), 1);
    assert_eq!(outcome.quality.count(SkipReason::UnparseableDate), 1);
    assert_eq!(outcome.quality.count(SkipReason::UnparseableAmount), 1);
    assert_eq!(outcome.quality.count(SkipReason::MissingCustomerId), 1);
    assert_eq!(outcome.quality.count(SkipReason::MissingOrderId), 1);
    assert_eq!(outcome.quality.count(SkipReason::UnknownStatus), 1);
    assert_eq!(outcome.quality.total_skipped(), 5);
}

/// A file with headers but no rows is an empty dataset, not an error.
#[test]
fn headers_only_is_empty_dataset() {
    let file = csv_file(&["order_id,customer_id,order_date,total"]);

    let outcome = load_transactions(file.path()).unwrap();

    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.quality.total_skipped(), 0);
}

/// Missing a required column is fatal and names the column.
#[test]
fn missing_required_column_is_fatal() {
    let file = csv_file(&[
        "order_id,customer_id,total",
        "o1,A,100",
    ]);

    let err = load_transactions(file.path()).unwrap_err();
    match err {
        AnalysisError::MissingColumn { column } => assert_eq!(column, "order_date"),
        other => panic!("expected MissingColumn, got {other}"),
    }
}

/// Optional columns default: no status column means completed, blank
/// category becomes "unknown".
#[test]
fn optional_columns_have_defaults() {
    let file = csv_file(&[
        "order_id,customer_id,order_date,total,category",
        "o1,A,2024-01-05,100,",
    ]);

    let outcome = load_transactions(file.path()).unwrap();

    let t = &outcome.dataset.transactions[0];
    assert_eq!(t.status, OrderStatus::Completed);
    assert_eq!(t.category, "unknown");
    assert_eq!(t.payment_method, "unknown");
    assert_eq!(t.region, "unknown");
}

/// Amounts tolerate currency formatting noise.
#[test]
fn amounts_accept_thousand_separators() {
    let file = csv_file(&[
        "order_id,customer_id,order_date,total",
        "o1,A,2024-01-05,\"1,234.50\"",
        "o2,B,2024-01-06,$99",
    ]);

    let outcome = load_transactions(file.path()).unwrap();

    assert_eq!(outcome.dataset.transactions[0].revenue_amount, 1234.5);
    assert_eq!(outcome.dataset.transactions[1].revenue_amount, 99.0);
}

/// An unreadable path aborts the run with the cause.
#[test]
fn unreadable_input_is_fatal() {
    let missing = std::path::Path::new("/nonexistent/sales.csv");
    assert!(load_transactions(missing).is_err());
}
