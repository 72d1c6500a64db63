//! Business KPI stage — grouped aggregates over the loaded dataset.
//!
//! This stage:
//!   1. Computes headline totals (revenue, orders, customers, AOV)
//!   2. Builds the chronological per-period revenue/order/AOV series
//!   3. Ranks revenue by category, payment method, and region
//!   4. Tallies the order-status distribution and cancellation rate
//!   5. Ranks the top customers by revenue and by order count
//!
//! Revenue aggregates only see revenue-eligible statuses; the status
//! distribution and cancellation rate always see every order.

use crate::{
    config::AnalysisConfig,
    error::AnalysisResult,
    period::Period,
    record::{Dataset, OrderStatus, Transaction},
    report::AnalysisReport,
    stage::AnalysisStage,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

// ── Public types ─────────────────────────────────────────────────────────────

/// One point of the per-period series.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodPoint {
    pub period: String,
    pub revenue: f64,
    pub orders: u64,
    /// revenue / orders; None when the period has no eligible orders.
    pub aov: Option<f64>,
}

/// Revenue and order count for one value of a grouping key.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSlice {
    pub key: String,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_customers: u64,
    pub overall_aov: Option<f64>,
    /// Cancelled orders over all orders, in [0, 1]. Zero when empty.
    pub cancellation_rate: f64,
    pub by_period: Vec<PeriodPoint>,
    pub by_category: Vec<RankedSlice>,
    pub by_payment_method: Vec<RankedSlice>,
    pub by_region: Vec<RankedSlice>,
    /// (status, distinct orders), descending.
    pub status_distribution: Vec<(String, u64)>,
    pub top_customers_by_revenue: Vec<CustomerSummary>,
    pub top_customers_by_orders: Vec<CustomerSummary>,
}

// ── Computation ──────────────────────────────────────────────────────────────

pub fn compute_kpis(dataset: &Dataset, config: &AnalysisConfig) -> KpiSummary {
    let eligible: Vec<&Transaction> = dataset
        .transactions
        .iter()
        .filter(|t| config.revenue_includes(t.status))
        .collect();

    let total_revenue: f64 = eligible.iter().map(|t| t.revenue_amount).sum();
    let total_orders = distinct(eligible.iter().map(|t| t.order_id.as_str()));
    let total_customers = distinct(
        dataset
            .transactions
            .iter()
            .map(|t| t.customer_id.as_str()),
    );
    let overall_aov = (total_orders > 0).then(|| total_revenue / total_orders as f64);

    // Per-period series, chronological.
    let mut periods: BTreeMap<Period, Group> = BTreeMap::new();
    for &txn in &eligible {
        periods
            .entry(config.granularity.truncate(txn.order_date))
            .or_default()
            .add(txn);
    }
    let by_period = periods
        .into_iter()
        .map(|(period, group)| {
            let orders = group.orders.len() as u64;
            PeriodPoint {
                period: period.label(),
                revenue: group.revenue,
                orders,
                aov: (orders > 0).then(|| group.revenue / orders as f64),
            }
        })
        .collect();

    // Status distribution and cancellation rate over ALL orders.
    let mut orders_by_status: HashMap<OrderStatus, HashSet<&str>> = HashMap::new();
    for txn in &dataset.transactions {
        orders_by_status
            .entry(txn.status)
            .or_default()
            .insert(txn.order_id.as_str());
    }
    let all_orders = distinct(
        dataset
            .transactions
            .iter()
            .map(|t| t.order_id.as_str()),
    );
    let cancelled = orders_by_status
        .get(&OrderStatus::Cancelled)
        .map_or(0, |s| s.len() as u64);
    let cancellation_rate = if all_orders > 0 {
        cancelled as f64 / all_orders as f64
    } else {
        0.0
    };
    let mut status_distribution: Vec<(String, u64)> = orders_by_status
        .iter()
        .map(|(status, orders)| (status.as_str().to_string(), orders.len() as u64))
        .collect();
    status_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let kpis = KpiSummary {
        total_revenue,
        total_orders,
        total_customers,
        overall_aov,
        cancellation_rate,
        by_period,
        by_category: ranked(&eligible, |t| &t.category),
        by_payment_method: ranked(&eligible, |t| &t.payment_method),
        by_region: ranked(&eligible, |t| &t.region),
        status_distribution,
        top_customers_by_revenue: top_customers(&eligible, config.top_n, |a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(Ordering::Equal)
        }),
        top_customers_by_orders: top_customers(&eligible, config.top_n, |a, b| {
            b.orders.cmp(&a.orders)
        }),
    };

    log::info!(
        "kpi: revenue={:.2} orders={} customers={} aov={:.2}",
        kpis.total_revenue,
        kpis.total_orders,
        kpis.total_customers,
        kpis.overall_aov.unwrap_or(0.0)
    );

    kpis
}

#[derive(Default)]
struct Group<'a> {
    revenue: f64,
    orders: HashSet<&'a str>,
}

impl<'a> Group<'a> {
    fn add(&mut self, txn: &'a Transaction) {
        self.revenue += txn.revenue_amount;
        self.orders.insert(txn.order_id.as_str());
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> u64 {
    ids.collect::<HashSet<_>>().len() as u64
}

fn ranked<'a>(
    eligible: &[&'a Transaction],
    key: impl Fn(&'a Transaction) -> &'a String,
) -> Vec<RankedSlice> {
    let mut groups: HashMap<&str, Group<'a>> = HashMap::new();
    for &txn in eligible {
        groups.entry(key(txn).as_str()).or_default().add(txn);
    }
    let mut slices: Vec<RankedSlice> = groups
        .into_iter()
        .map(|(key, group)| RankedSlice {
            key: key.to_string(),
            revenue: group.revenue,
            orders: group.orders.len() as u64,
        })
        .collect();
    slices.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    slices
}

fn top_customers(
    eligible: &[&Transaction],
    top_n: usize,
    order: impl Fn(&CustomerSummary, &CustomerSummary) -> Ordering,
) -> Vec<CustomerSummary> {
    let mut groups: HashMap<&str, Group<'_>> = HashMap::new();
    for &txn in eligible {
        groups
            .entry(txn.customer_id.as_str())
            .or_default()
            .add(txn);
    }
    let mut summaries: Vec<CustomerSummary> = groups
        .into_iter()
        .map(|(customer_id, group)| CustomerSummary {
            customer_id: customer_id.to_string(),
            revenue: group.revenue,
            orders: group.orders.len() as u64,
        })
        .collect();
    summaries.sort_by(|a, b| order(a, b).then_with(|| a.customer_id.cmp(&b.customer_id)));
    summaries.truncate(top_n);
    summaries
}

// ── Stage ────────────────────────────────────────────────────────────────────

pub struct KpiStage {
    config: AnalysisConfig,
}

impl KpiStage {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl AnalysisStage for KpiStage {
    fn name(&self) -> &'static str {
        "kpi"
    }

    fn run(&mut self, dataset: &Dataset, report: &mut AnalysisReport) -> AnalysisResult<()> {
        report.kpis = Some(compute_kpis(dataset, &self.config));
        Ok(())
    }
}
