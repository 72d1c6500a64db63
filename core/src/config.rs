//! Analysis configuration — JSON-loaded, with built-in defaults.
//!
//! A config file is optional: `AnalysisConfig::default()` reproduces the
//! standard monthly analysis. Every field can be overridden from JSON,
//! and the runner may override granularity/top_n again from flags.

use crate::period::Granularity;
use crate::record::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Period granularity for cohorts and per-period KPI series.
    #[serde(default)]
    pub granularity: Granularity,

    /// When true, only completed orders define a customer's cohort.
    /// Other rows still bucket into cells once the anchor exists; rows
    /// dated before the anchor are excluded as inconsistent.
    #[serde(default)]
    pub cohort_on_completed_only: bool,

    /// Statuses excluded from revenue KPIs and the revenue matrix.
    /// Status distribution and cancellation rate always see all rows.
    #[serde(default = "default_excluded_statuses")]
    pub revenue_excluded_statuses: Vec<OrderStatus>,

    /// Size of the top-customer and top-category rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Month,
            cohort_on_completed_only: false,
            revenue_excluded_statuses: default_excluded_statuses(),
            top_n: default_top_n(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn revenue_includes(&self, status: OrderStatus) -> bool {
        !self.revenue_excluded_statuses.contains(&status)
    }
}

fn default_excluded_statuses() -> Vec<OrderStatus> {
    vec![OrderStatus::Cancelled, OrderStatus::Refunded]
}

fn default_top_n() -> usize {
    10
}

// ── Generator parameters ─────────────────────────────────────────────────────

/// One product category with its Pareto amount band and draw weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBand {
    pub name: String,
    pub weight: f64,
    /// Minimum order amount for the band.
    pub amount_xmin: f64,
    /// Pareto shape parameter — higher means less skew.
    pub amount_alpha: f64,
    /// Hard cap so a single draw cannot dominate a cohort's revenue.
    pub amount_cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub categories: Vec<CategoryBand>,
    /// (method, weight) pairs.
    pub payment_methods: Vec<(String, f64)>,
    /// (region, weight) pairs.
    pub regions: Vec<(String, f64)>,

    /// Probability an existing customer places at least one order in a
    /// given month; decays with tenure to produce realistic cohort decay.
    pub monthly_repeat_rate: f64,
    /// Multiplicative decay applied to the repeat rate per elapsed month.
    pub repeat_rate_decay: f64,
    pub cancellation_rate: f64,
    pub refund_rate: f64,
    pub pending_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                band("electronics", 0.18, 120.0, 1.3, 2500.0),
                band("apparel", 0.27, 25.0, 1.6, 600.0),
                band("home_kitchen", 0.20, 35.0, 1.5, 900.0),
                band("beauty", 0.15, 15.0, 1.8, 300.0),
                band("grocery", 0.12, 10.0, 2.2, 150.0),
                band("sports", 0.08, 40.0, 1.5, 800.0),
            ],
            payment_methods: vec![
                ("card".into(), 0.48),
                ("cod".into(), 0.22),
                ("wallet".into(), 0.18),
                ("bank_transfer".into(), 0.12),
            ],
            regions: vec![
                ("north".into(), 0.30),
                ("south".into(), 0.28),
                ("east".into(), 0.22),
                ("west".into(), 0.20),
            ],
            monthly_repeat_rate: 0.32,
            repeat_rate_decay: 0.93,
            cancellation_rate: 0.07,
            refund_rate: 0.03,
            pending_rate: 0.02,
        }
    }
}

fn band(name: &str, weight: f64, xmin: f64, alpha: f64, cap: f64) -> CategoryBand {
    CategoryBand {
        name: name.into(),
        weight,
        amount_xmin: xmin,
        amount_alpha: alpha,
        amount_cap: cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_monthly_with_exclusions() {
        let config = AnalysisConfig::default();
        assert_eq!(config.granularity, Granularity::Month);
        assert!(!config.revenue_includes(OrderStatus::Cancelled));
        assert!(!config.revenue_includes(OrderStatus::Refunded));
        assert!(config.revenue_includes(OrderStatus::Completed));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let parsed: AnalysisConfig =
            serde_json::from_str(r#"{ "granularity": "quarter" }"#).unwrap();
        assert_eq!(parsed.granularity, Granularity::Quarter);
        assert_eq!(parsed.top_n, 10);
        assert!(!parsed.generator.categories.is_empty());
    }

    #[test]
    fn generator_weights_are_normalizable() {
        let g = GeneratorConfig::default();
        let total: f64 = g.categories.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-9, "category weights sum to {total}");
    }
}
