//! CSV ingestion with row-level data-quality accounting.
//!
//! This module:
//!   1. Normalizes headers (trim, lower-case, spaces to underscores)
//!   2. Resolves the export's column names onto the record model
//!   3. Parses dates (ISO and day-first forms) and amounts per row
//!   4. Skips and counts bad rows instead of failing the run
//!
//! Only an unreadable file or a missing required column is fatal.

use crate::error::{AnalysisError, AnalysisResult};
use crate::quality::{QualityReport, SkipReason};
use crate::record::{Dataset, OrderStatus, Transaction};
use chrono::NaiveDate;
use std::path::Path;

/// A loaded dataset plus the skip accounting from parsing it.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub quality: QualityReport,
}

/// Load the transaction export at `path` into memory.
pub fn load_transactions(path: &Path) -> AnalysisResult<LoadOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = Columns::resolve(&headers)?;

    let mut transactions = Vec::new();
    let mut quality = QualityReport::default();

    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let line = i + 2; // header occupies line 1

        let field = |idx: Option<usize>| idx.and_then(|c| row.get(c)).unwrap_or("");

        let customer_id = field(Some(columns.customer));
        if customer_id.is_empty() {
            skip(&mut quality, SkipReason::MissingCustomerId, line);
            continue;
        }

        let order_id = field(Some(columns.order));
        if order_id.is_empty() {
            skip(&mut quality, SkipReason::MissingOrderId, line);
            continue;
        }

        let raw_date = field(Some(columns.date));
        let order_date = match parse_date(raw_date) {
            Some(d) => d,
            None => {
                skip(&mut quality, SkipReason::UnparseableDate, line);
                continue;
            }
        };

        let raw_amount = field(Some(columns.amount));
        let revenue_amount = match parse_amount(raw_amount) {
            Some(v) => v,
            None => {
                skip(&mut quality, SkipReason::UnparseableAmount, line);
                continue;
            }
        };

        let raw_status = field(columns.status);
        let status = if raw_status.is_empty() {
            // No status column (or blank cell): assume the order went through.
            OrderStatus::Completed
        } else {
            match OrderStatus::parse(raw_status) {
                Some(s) => s,
                None => {
                    skip(&mut quality, SkipReason::UnknownStatus, line);
                    continue;
                }
            }
        };

        transactions.push(Transaction {
            customer_id: customer_id.to_string(),
            order_id: order_id.to_string(),
            order_date,
            revenue_amount,
            category: non_empty(field(columns.category)),
            payment_method: non_empty(field(columns.payment)),
            region: non_empty(field(columns.region)),
            status,
        });
    }

    if quality.is_clean() {
        log::info!("loader: {} rows loaded from {}", transactions.len(), path.display());
    } else {
        log::warn!(
            "loader: {} rows loaded, {} skipped from {}",
            transactions.len(),
            quality.total_skipped(),
            path.display()
        );
    }

    Ok(LoadOutcome {
        dataset: Dataset::new(transactions),
        quality,
    })
}

fn skip(quality: &mut QualityReport, reason: SkipReason, line: usize) {
    log::debug!("loader: line {line} skipped ({})", reason.as_str());
    quality.record(reason);
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(' ', "_")
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        "unknown".to_string()
    } else {
        value.to_string()
    }
}

/// ISO first, then the day-first forms the source exports actually use
/// (e.g. 01/10/2020 and 13-11-2020 both mean day-month-year).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace([',', '$'], "");
    let value: f64 = cleaned.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// ── Column resolution ────────────────────────────────────────────────────────

struct Columns {
    customer: usize,
    order: usize,
    date: usize,
    amount: usize,
    category: Option<usize>,
    payment: Option<usize>,
    region: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> AnalysisResult<Self> {
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| headers.iter().position(|h| h == n))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| AnalysisError::MissingColumn {
                column: names[0].to_string(),
            })
        };

        Ok(Self {
            customer: require(&["customer_id", "cust_id", "customerid"])?,
            order: require(&["order_id", "invoice_no", "order_no", "orderid"])?,
            date: require(&["order_date", "invoice_date", "date"])?,
            amount: require(&["revenue_amount", "total", "amount", "value", "grand_total"])?,
            category: find(&["category", "product_category"]),
            payment: find(&["payment_method", "payment"]),
            region: find(&["region", "zone"]),
            status: find(&["status", "order_status"]),
        })
    }
}
