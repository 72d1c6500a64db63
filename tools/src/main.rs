//! cohort-runner: batch analysis runner for e-commerce sales exports.
//!
//! Usage:
//!   cohort-runner analyze --input sales.csv --out-dir out --charts
//!   cohort-runner generate --seed 42 --customers 500 --periods 12 --out sales.csv

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use cohortlab_core::{
    chart,
    generator::{self, GeneratorParams},
    load_transactions, AnalysisConfig, AnalysisEngine, Granularity,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cohort-runner",
    version,
    about = "Cohort & sales analysis over e-commerce transaction exports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full analysis over a transaction CSV.
    Analyze {
        /// Path to the transaction export.
        #[arg(short, long)]
        input: PathBuf,

        /// Optional JSON config; defaults cover the standard monthly run.
        #[arg(short, long)]
        config: Option<String>,

        /// Override the configured period granularity.
        #[arg(short, long, value_enum)]
        granularity: Option<GranularityArg>,

        /// Directory for report.json, matrix CSVs and charts.
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,

        /// Render PNG charts in addition to the tables.
        #[arg(long)]
        charts: bool,

        /// Override the configured top-N ranking size.
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Produce a deterministic synthetic sales export.
    Generate {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 500)]
        customers: usize,

        /// Months of history to generate.
        #[arg(long, default_value_t = 12)]
        periods: u32,

        /// First day of the first month.
        #[arg(long, default_value = "2023-01-01")]
        start: NaiveDate,

        /// Optional JSON config supplying generator parameters.
        #[arg(short, long)]
        config: Option<String>,

        #[arg(short, long, default_value = "sales.csv")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GranularityArg {
    Month,
    Week,
    Quarter,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Month => Granularity::Month,
            GranularityArg::Week => Granularity::Week,
            GranularityArg::Quarter => Granularity::Quarter,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Analyze {
            input,
            config,
            granularity,
            out_dir,
            charts,
            top_n,
        } => analyze(input, config, granularity, out_dir, charts, top_n),
        Command::Generate {
            seed,
            customers,
            periods,
            start,
            config,
            out,
        } => generate(seed, customers, periods, start, config, out),
    }
}

fn analyze(
    input: PathBuf,
    config_path: Option<String>,
    granularity: Option<GranularityArg>,
    out_dir: PathBuf,
    charts: bool,
    top_n: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(g) = granularity {
        config.granularity = g.into();
    }
    if let Some(n) = top_n {
        config.top_n = n;
    }

    std::fs::create_dir_all(&out_dir)?;

    log::info!(
        "analyze: input={} granularity={}",
        input.display(),
        config.granularity.name()
    );
    let outcome = load_transactions(&input)?;
    let rows = outcome.dataset.len();

    let mut engine = AnalysisEngine::build(&config);
    let report = engine.run(&outcome.dataset, outcome.quality)?;

    report.render_text(&mut std::io::stdout().lock())?;
    report.write_json(&out_dir.join("report.json"))?;
    let mut files = report.write_matrix_csvs(&out_dir)?;
    if charts {
        files.extend(chart::render_all(&report, &out_dir)?);
    }

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  input:       {}", input.display());
    println!("  granularity: {}", config.granularity.name());
    println!("  rows:        {rows}");
    println!("  skipped:     {}", report.quality.total_skipped());
    println!(
        "  cohorts:     {}",
        report.cohorts.as_ref().map_or(0, |c| c.rows.len())
    );
    println!("  out dir:     {}", out_dir.display());
    for file in files {
        println!("    wrote {}", file.display());
    }
    Ok(())
}

fn generate(
    seed: u64,
    customers: usize,
    periods: u32,
    start: NaiveDate,
    config_path: Option<String>,
    out: PathBuf,
) -> Result<()> {
    let config = load_config(config_path)?;
    let params = GeneratorParams {
        seed,
        customers,
        periods,
        start,
    };

    let transactions = generator::generate(&params, &config.generator);
    generator::write_csv(&out, &transactions)?;

    println!("=== GENERATE SUMMARY ===");
    println!("  seed:      {seed}");
    println!("  customers: {customers}");
    println!("  periods:   {periods}");
    println!("  orders:    {}", transactions.len());
    println!("  wrote:     {}", out.display());
    Ok(())
}

fn load_config(path: Option<String>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::load(&p),
        None => Ok(AnalysisConfig::default()),
    }
}
