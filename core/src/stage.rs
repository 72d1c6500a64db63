//! Analysis stage trait.
//!
//! RULE: Every computation over the loaded dataset implements
//! AnalysisStage. The engine calls run() on each registered stage in
//! registration order, exactly once per run. Stages read the dataset,
//! write into the report, and never call each other.

use crate::{error::AnalysisResult, record::Dataset, report::AnalysisReport};

/// The contract every analysis stage must fulfill.
pub trait AnalysisStage {
    /// Unique stable name for this stage; appears in log lines.
    fn name(&self) -> &'static str;

    /// Called exactly once per run by the engine.
    ///
    /// - `dataset`: the full loaded dataset, immutable
    /// - `report`:  the shared report this stage writes its results into
    fn run(&mut self, dataset: &Dataset, report: &mut AnalysisReport) -> AnalysisResult<()>;
}
