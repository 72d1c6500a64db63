//! Data-quality accounting for rows excluded from the analysis.
//!
//! RULE: A bad row is never fatal. It is skipped, counted under a stable
//! reason, and surfaced in the final report. Only an unreadable input
//! source aborts a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a row was excluded. Stable names — these appear in reports
/// and log lines, never rename casually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    UnparseableDate,
    UnparseableAmount,
    MissingCustomerId,
    MissingOrderId,
    UnknownStatus,
    /// The row is dated before its customer's first recorded purchase.
    PrecedesFirstPurchase,
    /// No transaction of the customer qualifies to anchor a cohort
    /// (only possible when cohorts are restricted to completed orders).
    NoCohortAnchor,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnparseableDate => "unparseable_date",
            Self::UnparseableAmount => "unparseable_amount",
            Self::MissingCustomerId => "missing_customer_id",
            Self::MissingOrderId => "missing_order_id",
            Self::UnknownStatus => "unknown_status",
            Self::PrecedesFirstPurchase => "precedes_first_purchase",
            Self::NoCohortAnchor => "no_cohort_anchor",
        }
    }
}

/// Counts of skipped rows, keyed by reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    counts: BTreeMap<String, u64>,
}

impl QualityReport {
    pub fn record(&mut self, reason: SkipReason) {
        *self.counts.entry(reason.as_str().to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> u64 {
        self.counts.get(reason.as_str()).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    /// (reason, count) pairs in stable alphabetical order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Fold another report's counts into this one.
    pub fn merge(&mut self, other: &QualityReport) {
        for (reason, count) in &other.counts {
            *self.counts.entry(reason.clone()).or_insert(0) += count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_reason() {
        let mut q = QualityReport::default();
        q.record(SkipReason::UnparseableDate);
        q.record(SkipReason::UnparseableDate);
        q.record(SkipReason::MissingOrderId);

        assert_eq!(q.count(SkipReason::UnparseableDate), 2);
        assert_eq!(q.count(SkipReason::MissingOrderId), 1);
        assert_eq!(q.count(SkipReason::UnknownStatus), 0);
        assert_eq!(q.total_skipped(), 3);
        assert!(!q.is_clean());
    }

    #[test]
    fn merge_folds_counts() {
        let mut a = QualityReport::default();
        a.record(SkipReason::UnparseableAmount);

        let mut b = QualityReport::default();
        b.record(SkipReason::UnparseableAmount);
        b.record(SkipReason::PrecedesFirstPurchase);

        a.merge(&b);
        assert_eq!(a.count(SkipReason::UnparseableAmount), 2);
        assert_eq!(a.count(SkipReason::PrecedesFirstPurchase), 1);
    }
}
