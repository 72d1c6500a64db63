//! Report assembly and rendering.
//!
//! RULE: Only report.rs formats output. Stages write typed results into
//! AnalysisReport — text tables, JSON export, and matrix CSVs are all
//! rendered here, never inside a stage.

use crate::{
    cohort::CohortMatrices,
    error::AnalysisResult,
    kpi::KpiSummary,
    quality::QualityReport,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub quality: QualityReport,
    pub kpis: Option<KpiSummary>,
    pub cohorts: Option<CohortMatrices>,
}

impl AnalysisReport {
    /// Seed the report with the loader's skip accounting; stages fill
    /// in the rest.
    pub fn new(quality: QualityReport) -> Self {
        Self { quality, kpis: None, cohorts: None }
    }

    // ── Text rendering ─────────────────────────────────────────

    pub fn render_text(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if let Some(kpis) = &self.kpis {
            render_kpis(out, kpis)?;
        }
        if let Some(cohorts) = &self.cohorts {
            render_retention(out, cohorts)?;
            render_cohort_revenue(out, cohorts)?;
        }
        render_quality(out, &self.quality)?;
        Ok(())
    }

    // ── File exports ───────────────────────────────────────────

    pub fn write_json(&self, path: &Path) -> AnalysisResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("report: wrote {}", path.display());
        Ok(())
    }

    /// Write retention_matrix.csv and revenue_matrix.csv under `dir`.
    /// Unreached cells render as empty fields, not zeros.
    pub fn write_matrix_csvs(&self, dir: &Path) -> AnalysisResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        let Some(cohorts) = &self.cohorts else {
            return Ok(written);
        };

        let retention = dir.join("retention_matrix.csv");
        write_matrix(&retention, cohorts, |row, i| {
            row.retention_pct[i].map(|v| format!("{v:.2}"))
        })?;
        written.push(retention);

        let revenue = dir.join("revenue_matrix.csv");
        write_matrix(&revenue, cohorts, |row, i| {
            row.revenue[i].map(|v| format!("{v:.2}"))
        })?;
        written.push(revenue);

        for path in &written {
            log::info!("report: wrote {}", path.display());
        }
        Ok(written)
    }
}

fn write_matrix(
    path: &Path,
    cohorts: &CohortMatrices,
    cell: impl Fn(&crate::cohort::CohortRow, usize) -> Option<String>,
) -> AnalysisResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["cohort".to_string(), "size".to_string()];
    header.extend((0..=cohorts.max_index).map(|i| format!("p{i}")));
    writer.write_record(&header)?;

    for row in &cohorts.rows {
        let mut record = vec![row.label.clone(), row.size.to_string()];
        record.extend((0..=cohorts.max_index).map(|i| cell(row, i).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Section renderers ────────────────────────────────────────────────────────

fn render_kpis(out: &mut dyn Write, kpis: &KpiSummary) -> std::io::Result<()> {
    writeln!(out, "=== BASIC KPIS ===")?;
    writeln!(out, "  revenue:        {:.2}", kpis.total_revenue)?;
    writeln!(out, "  orders:         {}", kpis.total_orders)?;
    writeln!(out, "  customers:      {}", kpis.total_customers)?;
    match kpis.overall_aov {
        Some(aov) => writeln!(out, "  AOV:            {aov:.2}")?,
        None => writeln!(out, "  AOV:            n/a")?,
    }
    writeln!(out, "  cancellation:   {:.1}%", kpis.cancellation_rate * 100.0)?;

    writeln!(out)?;
    writeln!(out, "=== REVENUE BY PERIOD ===")?;
    writeln!(out, "  {:<10} {:>14} {:>8} {:>10}", "period", "revenue", "orders", "AOV")?;
    for point in &kpis.by_period {
        let aov = point.aov.map_or("".to_string(), |v| format!("{v:.2}"));
        writeln!(
            out,
            "  {:<10} {:>14.2} {:>8} {:>10}",
            point.period, point.revenue, point.orders, aov
        )?;
    }

    render_ranked(out, "REVENUE BY CATEGORY", &kpis.by_category)?;
    render_ranked(out, "REVENUE BY PAYMENT METHOD", &kpis.by_payment_method)?;
    render_ranked(out, "REVENUE BY REGION", &kpis.by_region)?;

    writeln!(out)?;
    writeln!(out, "=== ORDER STATUS ===")?;
    for (status, count) in &kpis.status_distribution {
        writeln!(out, "  {status:<12} {count:>8}")?;
    }

    writeln!(out)?;
    writeln!(out, "=== TOP CUSTOMERS BY REVENUE ===")?;
    for c in &kpis.top_customers_by_revenue {
        writeln!(out, "  {:<16} {:>14.2} ({} orders)", c.customer_id, c.revenue, c.orders)?;
    }

    writeln!(out)?;
    writeln!(out, "=== TOP CUSTOMERS BY ORDERS ===")?;
    for c in &kpis.top_customers_by_orders {
        writeln!(out, "  {:<16} {:>6} orders ({:.2})", c.customer_id, c.orders, c.revenue)?;
    }
    Ok(())
}

fn render_ranked(
    out: &mut dyn Write,
    title: &str,
    slices: &[crate::kpi::RankedSlice],
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== {title} ===")?;
    for slice in slices {
        writeln!(out, "  {:<16} {:>14.2} ({} orders)", slice.key, slice.revenue, slice.orders)?;
    }
    Ok(())
}

fn render_retention(out: &mut dyn Write, cohorts: &CohortMatrices) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== RETENTION MATRIX (%) ===")?;
    if cohorts.is_empty() {
        writeln!(out, "  (empty dataset)")?;
        return Ok(());
    }

    write!(out, "  {:<10} {:>6}", "cohort", "size")?;
    for i in 0..=cohorts.max_index {
        write!(out, " {:>6}", format!("p{i}"))?;
    }
    writeln!(out)?;

    for row in &cohorts.rows {
        write!(out, "  {:<10} {:>6}", row.label, row.size)?;
        for cell in &row.retention_pct {
            match cell {
                Some(pct) => write!(out, " {pct:>6.1}")?,
                None => write!(out, " {:>6}", "")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_cohort_revenue(out: &mut dyn Write, cohorts: &CohortMatrices) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== COHORT REVENUE ===")?;
    if cohorts.is_empty() {
        writeln!(out, "  (empty dataset)")?;
        return Ok(());
    }

    for row in &cohorts.rows {
        write!(out, "  {:<10}", row.label)?;
        for cell in &row.revenue {
            match cell {
                Some(v) => write!(out, " {v:>10.0}")?,
                None => write!(out, " {:>10}", "")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_quality(out: &mut dyn Write, quality: &QualityReport) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== DATA QUALITY ===")?;
    if quality.is_clean() {
        writeln!(out, "  no rows skipped")?;
        return Ok(());
    }
    writeln!(out, "  skipped rows: {}", quality.total_skipped())?;
    for (reason, count) in quality.entries() {
        writeln!(out, "    {reason:<24} {count:>6}")?;
    }
    Ok(())
}
