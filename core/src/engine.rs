//! The analysis engine — one pass over the loaded dataset.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. KPI stage
//!   2. Cohort stage
//!
//! RULES:
//!   - Stages execute in registration order, exactly once per run.
//!   - Each stage reads only the dataset; results go into the report.
//!   - No stage calls another stage.

use crate::{
    cohort::CohortStage,
    config::AnalysisConfig,
    error::AnalysisResult,
    kpi::KpiStage,
    quality::QualityReport,
    record::Dataset,
    report::AnalysisReport,
    stage::AnalysisStage,
};

pub struct AnalysisEngine {
    stages: Vec<Box<dyn AnalysisStage>>,
}

impl AnalysisEngine {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: &AnalysisConfig) -> Self {
        let mut engine = AnalysisEngine::new();
        engine.register(Box::new(KpiStage::new(config.clone())));
        engine.register(Box::new(CohortStage::new(config.clone())));
        engine
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn AnalysisStage>) {
        self.stages.push(stage);
    }

    /// Run every stage over the dataset. `quality` carries the loader's
    /// skip accounting forward; stages append their own exclusions.
    pub fn run(
        &mut self,
        dataset: &Dataset,
        quality: QualityReport,
    ) -> AnalysisResult<AnalysisReport> {
        let mut report = AnalysisReport::new(quality);

        for stage in &mut self.stages {
            log::debug!("stage={} starting over {} rows", stage.name(), dataset.len());
            stage.run(dataset, &mut report)?;
            log::info!("stage={} complete", stage.name());
        }

        Ok(report)
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
