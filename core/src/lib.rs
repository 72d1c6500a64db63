//! cohortlab-core: batch cohort & sales analysis for e-commerce
//! transaction exports.
//!
//! The pipeline is deliberately simple: load a CSV wholesale into
//! memory, run the analysis stages in a fixed order, then render the
//! assembled report as text tables, JSON, matrix CSVs, and charts.
//! Bad rows are skipped and counted, never fatal; everything is
//! recomputed from scratch on each run.

pub mod chart;
pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod kpi;
pub mod loader;
pub mod period;
pub mod quality;
pub mod record;
pub mod report;
pub mod rng;
pub mod stage;
pub mod types;

pub use cohort::{CohortAggregator, CohortMatrices};
pub use config::AnalysisConfig;
pub use engine::AnalysisEngine;
pub use error::{AnalysisError, AnalysisResult};
pub use loader::{load_transactions, LoadOutcome};
pub use period::{Granularity, Period};
pub use record::{Dataset, OrderStatus, Transaction};
pub use report::AnalysisReport;
