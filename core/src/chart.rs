//! Chart rendering — the plotting sink for the assembled report.
//!
//! Renders the figures the analysis is usually read through: retention
//! and cohort-revenue heatmaps, the per-period revenue/order/AOV lines,
//! and the category/payment/status bars. Rendering is optional and
//! never feeds back into the computation; a chart failure is reported
//! as an ordinary error.

use crate::cohort::CohortMatrices;
use crate::error::{AnalysisError, AnalysisResult};
use crate::kpi::KpiSummary;
use crate::report::AnalysisReport;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (1000, 600);
const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);

/// Render every chart the report has data for. Returns the files written.
pub fn render_all(report: &AnalysisReport, dir: &Path) -> AnalysisResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(kpis) = &report.kpis {
        render_kpi_charts(kpis, dir, &mut written)
            .map_err(|e| AnalysisError::Chart(e.to_string()))?;
    }
    if let Some(cohorts) = &report.cohorts {
        render_cohort_charts(cohorts, dir, &mut written)
            .map_err(|e| AnalysisError::Chart(e.to_string()))?;
    }

    for path in &written {
        log::info!("chart: wrote {}", path.display());
    }
    Ok(written)
}

fn render_kpi_charts(
    kpis: &KpiSummary,
    dir: &Path,
    written: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    let revenue: Vec<(String, f64)> = kpis
        .by_period
        .iter()
        .map(|p| (p.period.clone(), p.revenue))
        .collect();
    if !revenue.is_empty() {
        let path = dir.join("revenue_over_time.png");
        line_chart(&path, "Revenue Over Time", "Revenue", &revenue, &BLUE)?;
        written.push(path);
    }

    let orders: Vec<(String, f64)> = kpis
        .by_period
        .iter()
        .map(|p| (p.period.clone(), p.orders as f64))
        .collect();
    if !orders.is_empty() {
        let path = dir.join("orders_over_time.png");
        line_chart(&path, "Orders Over Time", "Orders", &orders, &GREEN)?;
        written.push(path);
    }

    let aov: Vec<(String, f64)> = kpis
        .by_period
        .iter()
        .map(|p| (p.period.clone(), p.aov.unwrap_or(0.0)))
        .collect();
    if !aov.is_empty() {
        let path = dir.join("aov_over_time.png");
        line_chart(&path, "Average Order Value by Period", "AOV", &aov, &RED)?;
        written.push(path);
    }

    let categories: Vec<(String, f64)> = kpis
        .by_category
        .iter()
        .take(10)
        .map(|s| (s.key.clone(), s.revenue))
        .collect();
    if !categories.is_empty() {
        let path = dir.join("revenue_by_category.png");
        bar_chart(&path, "Revenue by Category (Top 10)", "Revenue", &categories)?;
        written.push(path);
    }

    let payments: Vec<(String, f64)> = kpis
        .by_payment_method
        .iter()
        .map(|s| (s.key.clone(), s.revenue))
        .collect();
    if !payments.is_empty() {
        let path = dir.join("revenue_by_payment.png");
        bar_chart(&path, "Revenue by Payment Method", "Revenue", &payments)?;
        written.push(path);
    }

    let statuses: Vec<(String, f64)> = kpis
        .status_distribution
        .iter()
        .map(|(status, count)| (status.clone(), *count as f64))
        .collect();
    if !statuses.is_empty() {
        let path = dir.join("status_distribution.png");
        bar_chart(&path, "Order Status Distribution", "Orders", &statuses)?;
        written.push(path);
    }

    Ok(())
}

fn render_cohort_charts(
    cohorts: &CohortMatrices,
    dir: &Path,
    written: &mut Vec<PathBuf>,
) -> anyhow::Result<()> {
    if cohorts.is_empty() {
        return Ok(());
    }

    let retention_path = dir.join("retention_heatmap.png");
    heatmap(
        &retention_path,
        "Customer Retention by Cohort (%)",
        cohorts,
        |row, i| row.retention_pct[i],
        100.0,
        blue_scale,
    )?;
    written.push(retention_path);

    let max_revenue = cohorts
        .rows
        .iter()
        .flat_map(|r| r.revenue.iter().flatten())
        .fold(0.0f64, |a, &b| a.max(b));
    let revenue_path = dir.join("cohort_revenue_heatmap.png");
    heatmap(
        &revenue_path,
        "Revenue by Cohort and Elapsed Period",
        cohorts,
        |row, i| row.revenue[i],
        max_revenue.max(1.0),
        green_scale,
    )?;
    written.push(revenue_path);

    Ok(())
}

// ── Primitives ───────────────────────────────────────────────────────────────

fn line_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    points: &[(String, f64)],
    color: &RGBColor,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = points.iter().map(|(_, v)| *v).fold(0.0f64, f64::max).max(1.0);
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max * 1.15)?;

    chart
        .configure_mesh()
        .x_desc("Period")
        .y_desc(y_desc)
        .x_labels(points.len().min(12))
        .x_label_formatter(&|x| label_at(points, *x))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().enumerate().map(|(i, (_, v))| (i as f64, *v)),
        color,
    ))?;
    chart.draw_series(
        points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| Circle::new((i as f64, *v), 4, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    bars: &[(String, f64)],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = bars.iter().map(|(_, v)| *v).fold(0.0f64, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..bars.len() as f64, 0f64..y_max * 1.15)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(y_desc)
        .x_labels(bars.len())
        .x_label_formatter(&|x| label_at(bars, *x))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, v))| {
        Rectangle::new([(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *v)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    Ok(())
}

fn heatmap(
    path: &Path,
    title: &str,
    cohorts: &CohortMatrices,
    value: impl Fn(&crate::cohort::CohortRow, usize) -> Option<f64>,
    max_value: f64,
    scale: fn(f64) -> RGBColor,
) -> anyhow::Result<()> {
    let rows = cohorts.rows.len();
    let cols = cohorts.max_index + 1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..cols as f64, 0f64..rows as f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Periods since first purchase")
        .y_desc("Cohort")
        .x_labels(cols.min(24))
        .x_label_formatter(&|x| format!("p{}", *x as usize))
        .y_labels(rows.min(24))
        .y_label_formatter(&|y| {
            // Row 0 is drawn at the top.
            let idx = rows.saturating_sub(1).saturating_sub(*y as usize);
            cohorts
                .rows
                .get(idx)
                .map(|r| r.label.clone())
                .unwrap_or_default()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (r, row) in cohorts.rows.iter().enumerate() {
        let y = (rows - 1 - r) as f64;
        for c in 0..cols {
            let color = match value(row, c) {
                Some(v) => scale((v / max_value).clamp(0.0, 1.0)),
                // Unreached cells stay visibly blank.
                None => RGBColor(245, 245, 245),
            };
            chart.draw_series(std::iter::once(Rectangle::new(
                [(c as f64 + 0.02, y + 0.02), (c as f64 + 0.98, y + 0.98)],
                color.filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn label_at(items: &[(String, f64)], x: f64) -> String {
    items
        .get(x.round() as usize)
        .map(|(label, _)| label.clone())
        .unwrap_or_default()
}

fn blue_scale(t: f64) -> RGBColor {
    RGBColor(
        (235.0 - 185.0 * t) as u8,
        (245.0 - 155.0 * t) as u8,
        255,
    )
}

fn green_scale(t: f64) -> RGBColor {
    RGBColor(
        (235.0 - 200.0 * t) as u8,
        250,
        (235.0 - 185.0 * t) as u8,
    )
}
