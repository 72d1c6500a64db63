//! Synthetic transaction dataset generator.
//!
//! Produces a deterministic e-commerce sales export shaped like the
//! real thing: one row per order with customer, date, amount, category,
//! payment method, region and status. Repeat behavior decays with
//! tenure, so generated cohorts show the retention falloff the
//! analysis is built to surface. Same seed ⇒ identical output.

use crate::config::GeneratorConfig;
use crate::error::AnalysisResult;
use crate::record::{OrderStatus, Transaction};
use crate::rng::{RngBank, SamplerSlot};
use chrono::{Datelike, NaiveDate};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub seed: u64,
    pub customers: usize,
    /// Number of whole months of history to produce.
    pub periods: u32,
    /// First day of the first month.
    pub start: NaiveDate,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            seed: 42,
            customers: 500,
            periods: 12,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid start date"),
        }
    }
}

/// Generate the full synthetic order history, chronologically sorted.
pub fn generate(params: &GeneratorParams, config: &GeneratorConfig) -> Vec<Transaction> {
    let bank = RngBank::new(params.seed);
    let mut customers_rng = bank.for_sampler(SamplerSlot::Customers);
    let mut orders_rng = bank.for_sampler(SamplerSlot::Orders);
    let mut amounts_rng = bank.for_sampler(SamplerSlot::Amounts);
    let mut attrs_rng = bank.for_sampler(SamplerSlot::Attributes);

    let category_weights: Vec<f64> = config.categories.iter().map(|c| c.weight).collect();
    let payment_weights: Vec<f64> = config.payment_methods.iter().map(|(_, w)| *w).collect();
    let region_weights: Vec<f64> = config.regions.iter().map(|(_, w)| *w).collect();

    let mut transactions = Vec::new();

    for i in 0..params.customers {
        let customer_id = format!("c-{i:05}");
        let signup_month = customers_rng.next_u64_below(params.periods.max(1) as u64) as u32;
        let region = config.regions[attrs_rng.pick_weighted(&region_weights)].0.clone();

        for month in signup_month..params.periods {
            let tenure = month - signup_month;
            // The signup month always orders; afterwards the repeat
            // probability decays multiplicatively with tenure.
            if tenure > 0 {
                let p = config.monthly_repeat_rate
                    * config.repeat_rate_decay.powi(tenure as i32 - 1);
                if !orders_rng.chance(p) {
                    continue;
                }
            }

            // 1 order, occasionally 2 or 3 in a busy month.
            let mut order_count = 1;
            if orders_rng.chance(0.25) {
                order_count += 1;
            }
            if orders_rng.chance(0.08) {
                order_count += 1;
            }

            for _ in 0..order_count {
                let day = 1 + orders_rng.next_u64_below(28) as u32;
                let order_date = month_date(params.start, month, day);

                let band = &config.categories[attrs_rng.pick_weighted(&category_weights)];
                let raw = amounts_rng
                    .pareto(band.amount_xmin, band.amount_alpha)
                    .min(band.amount_cap);
                let revenue_amount = (raw * 100.0).round() / 100.0;

                let order_id =
                    Uuid::from_u64_pair(orders_rng.next_u64(), orders_rng.next_u64()).to_string();
                let payment_method =
                    config.payment_methods[attrs_rng.pick_weighted(&payment_weights)].0.clone();

                transactions.push(Transaction {
                    customer_id: customer_id.clone(),
                    order_id,
                    order_date,
                    revenue_amount,
                    category: band.name.clone(),
                    payment_method,
                    region: region.clone(),
                    status: roll_status(config, &mut attrs_rng),
                });
            }
        }
    }

    // Chronological output, like a real export; order id breaks ties so
    // the sort itself is deterministic.
    transactions.sort_by(|a, b| {
        a.order_date
            .cmp(&b.order_date)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    log::info!(
        "generator: {} orders for {} customers over {} months (seed {})",
        transactions.len(),
        params.customers,
        params.periods,
        params.seed
    );

    transactions
}

/// Write the generated history as a standard transaction CSV.
pub fn write_csv(path: &Path, transactions: &[Transaction]) -> AnalysisResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for txn in transactions {
        writer.serialize(txn)?;
    }
    writer.flush()?;
    log::info!("generator: wrote {} rows to {}", transactions.len(), path.display());
    Ok(())
}

fn roll_status(config: &GeneratorConfig, rng: &mut crate::rng::SamplerRng) -> OrderStatus {
    let roll = rng.next_f64();
    if roll < config.cancellation_rate {
        OrderStatus::Cancelled
    } else if roll < config.cancellation_rate + config.refund_rate {
        OrderStatus::Refunded
    } else if roll < config.cancellation_rate + config.refund_rate + config.pending_rate {
        OrderStatus::Pending
    } else {
        OrderStatus::Completed
    }
}

fn month_date(start: NaiveDate, month_offset: u32, day: u32) -> NaiveDate {
    let months = start.month0() + month_offset;
    let year = start.year() + (months / 12) as i32;
    let month = months % 12 + 1;
    // day stays ≤ 28, so every month accepts it
    NaiveDate::from_ymd_opt(year, month, day.min(28)).expect("valid generated date")
}
