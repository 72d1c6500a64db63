//! Cohort aggregation — retention and revenue matrices.
//!
//! This module:
//!   1. Anchors every customer to a first-purchase period
//!   2. Buckets each transaction into its (cohort, elapsed-index) cell
//!   3. Builds the distinct-customer and revenue matrices
//!   4. Normalizes retention rows against their index-0 size
//!
//! Cells a cohort is too young to reach are None, never zero; a reachable
//! cell with no activity is zero. Rows are chronological. Rows dated
//! before their customer's anchor are excluded and counted, never fatal.

use crate::{
    config::AnalysisConfig,
    error::AnalysisResult,
    period::{Granularity, Period},
    quality::{QualityReport, SkipReason},
    record::{Dataset, OrderStatus},
    report::AnalysisReport,
    stage::AnalysisStage,
    types::ElapsedIndex,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

/// One cohort's row across all elapsed indexes, padded to the matrix width.
#[derive(Debug, Clone, Serialize)]
pub struct CohortRow {
    pub cohort: Period,
    pub label: String,
    /// Distinct customers at index 0 — the cohort size.
    pub size: u64,
    /// Distinct active customers per elapsed index.
    pub customers: Vec<Option<u64>>,
    /// Revenue sum per elapsed index (revenue-eligible statuses only).
    pub revenue: Vec<Option<f64>>,
    /// customers normalized by size, as percentages. Index 0 is 100%.
    pub retention_pct: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortMatrices {
    pub granularity: Granularity,
    /// Widest observed elapsed index, inclusive. 0 for an empty matrix.
    pub max_index: ElapsedIndex,
    /// Rows in chronological cohort order.
    pub rows: Vec<CohortRow>,
}

impl CohortMatrices {
    pub fn empty(granularity: Granularity) -> Self {
        Self { granularity, max_index: 0, rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total distinct anchored customers — the sum of cohort sizes.
    pub fn total_customers(&self) -> u64 {
        self.rows.iter().map(|r| r.size).sum()
    }
}

// ── Aggregator ───────────────────────────────────────────────────────────────

pub struct CohortAggregator {
    granularity: Granularity,
    completed_only: bool,
    revenue_excluded: Vec<OrderStatus>,
}

impl CohortAggregator {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            completed_only: false,
            revenue_excluded: Vec::new(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            granularity: config.granularity,
            completed_only: config.cohort_on_completed_only,
            revenue_excluded: config.revenue_excluded_statuses.clone(),
        }
    }

    /// Restrict cohort anchoring to completed orders.
    pub fn completed_only(mut self, yes: bool) -> Self {
        self.completed_only = yes;
        self
    }

    pub fn aggregate(&self, dataset: &Dataset, quality: &mut QualityReport) -> CohortMatrices {
        let anchors = self.anchor_customers(dataset);

        // Bucket pass: distinct customers and revenue per (cohort, index).
        let mut cells: BTreeMap<Period, BTreeMap<ElapsedIndex, Cell<'_>>> = BTreeMap::new();
        let mut latest: Option<Period> = None;

        for txn in &dataset.transactions {
            let anchor = match anchors.get(txn.customer_id.as_str()) {
                Some(date) => *date,
                None => {
                    log::debug!(
                        "cohort: {} order {} has no cohort anchor",
                        txn.customer_id,
                        txn.order_id
                    );
                    quality.record(SkipReason::NoCohortAnchor);
                    continue;
                }
            };

            let cohort = self.granularity.truncate(anchor);
            let period = self.granularity.truncate(txn.order_date);
            let index = match period.index_since(&cohort) {
                Some(i) => i,
                None => {
                    log::debug!(
                        "cohort: {} order {} dated {} precedes first purchase {}",
                        txn.customer_id,
                        txn.order_id,
                        txn.order_date,
                        anchor
                    );
                    quality.record(SkipReason::PrecedesFirstPurchase);
                    continue;
                }
            };

            latest = Some(latest.map_or(period, |p| p.max(period)));

            let cell = cells
                .entry(cohort)
                .or_default()
                .entry(index)
                .or_default();
            cell.customers.insert(txn.customer_id.as_str());
            if !self.revenue_excluded.contains(&txn.status) {
                cell.revenue += txn.revenue_amount;
            }
        }

        let latest = match latest {
            Some(p) => p,
            None => return CohortMatrices::empty(self.granularity),
        };

        // Build pass: pad every row to the global width; cells beyond a
        // cohort's reachable horizon stay None.
        let max_index = cells
            .keys()
            .filter_map(|cohort| latest.index_since(cohort))
            .max()
            .unwrap_or(0);

        let rows: Vec<CohortRow> = cells
            .iter()
            .map(|(cohort, buckets)| self.build_row(*cohort, buckets, latest, max_index))
            .collect();

        log::info!(
            "cohort: {} cohorts over {} {}s, {} customers",
            rows.len(),
            max_index + 1,
            self.granularity.name(),
            rows.iter().map(|r| r.size).sum::<u64>()
        );

        CohortMatrices { granularity: self.granularity, max_index, rows }
    }

    /// Minimum eligible order date per customer.
    fn anchor_customers<'a>(&self, dataset: &'a Dataset) -> HashMap<&'a str, NaiveDate> {
        let mut anchors: HashMap<&str, NaiveDate> = HashMap::new();
        for txn in &dataset.transactions {
            if self.completed_only && txn.status != OrderStatus::Completed {
                continue;
            }
            anchors
                .entry(txn.customer_id.as_str())
                .and_modify(|d| {
                    if txn.order_date < *d {
                        *d = txn.order_date;
                    }
                })
                .or_insert(txn.order_date);
        }
        anchors
    }

    fn build_row(
        &self,
        cohort: Period,
        buckets: &BTreeMap<ElapsedIndex, Cell<'_>>,
        latest: Period,
        max_index: ElapsedIndex,
    ) -> CohortRow {
        let reachable = latest.index_since(&cohort).unwrap_or(0);

        let mut customers: Vec<Option<u64>> = (0..=max_index)
            .map(|i| (i <= reachable).then_some(0))
            .collect();
        let mut revenue: Vec<Option<f64>> = (0..=max_index)
            .map(|i| (i <= reachable).then_some(0.0))
            .collect();

        for (&index, cell) in buckets {
            customers[index] = Some(cell.customers.len() as u64);
            revenue[index] = Some(cell.revenue);
        }

        let size = customers.first().copied().flatten().unwrap_or(0);
        let retention_pct = customers
            .iter()
            .map(|c| match (c, size) {
                (Some(n), s) if s > 0 => Some(*n as f64 / s as f64 * 100.0),
                _ => None,
            })
            .collect();

        CohortRow {
            cohort,
            label: cohort.label(),
            size,
            customers,
            revenue,
            retention_pct,
        }
    }
}

#[derive(Default)]
struct Cell<'a> {
    customers: HashSet<&'a str>,
    revenue: f64,
}

// ── Stage ────────────────────────────────────────────────────────────────────

pub struct CohortStage {
    config: AnalysisConfig,
}

impl CohortStage {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl AnalysisStage for CohortStage {
    fn name(&self) -> &'static str {
        "cohort"
    }

    fn run(&mut self, dataset: &Dataset, report: &mut AnalysisReport) -> AnalysisResult<()> {
        let matrices = CohortAggregator::from_config(&self.config)
            .aggregate(dataset, &mut report.quality);
        report.cohorts = Some(matrices);
        Ok(())
    }
}
