use chrono::NaiveDate;
use cohortlab_core::{
    config::GeneratorConfig,
    generator::{generate, GeneratorParams},
    quality::QualityReport,
    record::Dataset,
    AnalysisConfig, AnalysisEngine,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn generated_dataset(seed: u64) -> Dataset {
    let params = GeneratorParams {
        seed,
        customers: 80,
        periods: 6,
        start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    };
    Dataset::new(generate(&params, &GeneratorConfig::default()))
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// A full run over generated data fills in both stages' results, and the
/// cohort sizes agree with the KPI stage's distinct-customer count.
#[test]
fn full_run_fills_report_consistently() {
    let dataset = generated_dataset(42);

    let mut engine = AnalysisEngine::build(&AnalysisConfig::default());
    let report = engine.run(&dataset, QualityReport::default()).unwrap();

    let kpis = report.kpis.as_ref().expect("kpi stage ran");
    let cohorts = report.cohorts.as_ref().expect("cohort stage ran");

    assert!(kpis.total_orders > 0);
    assert_eq!(
        cohorts.total_customers(),
        kpis.total_customers,
        "every customer anchors to exactly one cohort"
    );

    for row in &cohorts.rows {
        for pct in row.retention_pct.iter().flatten() {
            assert!((0.0..=100.0).contains(pct), "retention {pct} out of range");
        }
        assert_eq!(row.retention_pct[0], Some(100.0));
    }
}

/// Empty input flows through the whole engine into empty outputs.
#[test]
fn empty_dataset_runs_clean() {
    let mut engine = AnalysisEngine::build(&AnalysisConfig::default());
    let report = engine
        .run(&Dataset::default(), QualityReport::default())
        .unwrap();

    assert_eq!(report.kpis.as_ref().unwrap().total_orders, 0);
    assert!(report.cohorts.as_ref().unwrap().is_empty());
    assert!(report.quality.is_clean());
}

/// The report's file exports land on disk and the JSON parses back.
#[test]
fn report_exports_write_files() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = generated_dataset(7);

    let mut engine = AnalysisEngine::build(&AnalysisConfig::default());
    let report = engine.run(&dataset, QualityReport::default()).unwrap();

    let json_path = dir.path().join("report.json");
    report.write_json(&json_path).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert!(parsed["kpis"]["total_orders"].as_u64().unwrap() > 0);

    let written = report.write_matrix_csvs(dir.path()).unwrap();
    assert_eq!(written.len(), 2);
    for path in written {
        assert!(path.exists(), "{} missing", path.display());
    }

    let rendered = {
        let mut buf = Vec::new();
        report.render_text(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    };
    assert!(rendered.contains("=== BASIC KPIS ==="));
    assert!(rendered.contains("=== RETENTION MATRIX (%) ==="));
}
