//! Viability Engine CLI
//!
//! Recalculate scenarios from a CSV data directory, compare projections with
//! recorded actuals, or score a metrics triple.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use viability_engine::{
    narrative::{format_currency, OfflineNarrative},
    report::CsvReportSink,
    scenario::{parse_date, CsvScenarioStore},
    EngineConfig, Metrics, Recalculator, RecalculationReport,
};

#[derive(Debug, Parser)]
#[command(name = "viability", version, about = "Development viability projections and metrics")]
struct Cli {
    /// JSON file with engine policy overrides (defaults and env vars otherwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the annual NPV discount rate (e.g. 0.12)
    #[arg(long, global = true)]
    discount_rate: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recompute projections, metrics and reports for scenarios
    Recalculate(RecalculateArgs),
    /// Compare the projection with recorded actuals
    Compare(CompareArgs),
    /// Health score for a metrics triple
    Score(ScoreArgs),
}

#[derive(Debug, Args)]
struct RecalculateArgs {
    /// Directory holding scenarios.csv, units_mix.csv, cost_line_items.csv
    #[arg(long, default_value = "data/sample")]
    data_dir: PathBuf,

    /// Directory the reports are written to
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Scenario ids to recompute (all when omitted)
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CompareArgs {
    #[arg(long, default_value = "data/sample")]
    data_dir: PathBuf,

    #[arg(long)]
    scenario: String,

    /// As-of date (YYYY-MM-DD); the pivot is the months elapsed since the base date
    #[arg(long, conflicts_with = "pivot")]
    as_of: Option<String>,

    /// Explicit pivot month
    #[arg(long)]
    pivot: Option<usize>,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ScoreArgs {
    #[arg(long, allow_hyphen_values = true)]
    irr: f64,
    #[arg(long, allow_hyphen_values = true)]
    npv: f64,
    #[arg(long, allow_hyphen_values = true)]
    roi: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Recalculate(args) => recalculate(config, args),
        Command::Compare(args) => compare(config, args),
        Command::Score(args) => {
            let metrics = Metrics { irr: args.irr, npv: args.npv, roi: args.roi };
            println!("{}", viability_engine::health_score(&metrics));
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::from_env(),
    };
    Ok(match cli.discount_rate {
        Some(rate) => config.with_discount_rate(rate),
        None => config,
    })
}

fn recalculate(config: EngineConfig, args: RecalculateArgs) -> Result<()> {
    let store = CsvScenarioStore::open(&args.data_dir, &config)
        .with_context(|| format!("loading scenarios from {}", args.data_dir.display()))?;
    let sink = CsvReportSink::new(&args.out_dir)
        .with_context(|| format!("preparing output directory {}", args.out_dir.display()))?;

    let recalculator = Recalculator::new(config, store, sink, OfflineNarrative);
    let ids = if args.scenarios.is_empty() {
        recalculator.source().scenario_ids()
    } else {
        args.scenarios.clone()
    };
    let results = recalculator.recalculate_all(&ids);

    let mut reports = Vec::new();
    let mut failures = 0;
    for (id, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                eprintln!("Scenario {}: {}", id, e);
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&reports);
        println!("\nReports written to: {}", args.out_dir.display());
    }

    if failures > 0 {
        anyhow::bail!("{} of {} scenarios failed", failures, ids.len());
    }
    Ok(())
}

fn print_reports(reports: &[RecalculationReport]) {
    println!(
        "{:<16} {:<24} {:>6} {:>10} {:>18} {:>8} {:>6}",
        "Scenario", "Name", "Months", "IRR", "NPV", "ROI", "Score"
    );
    println!("{}", "-".repeat(94));

    for report in reports {
        println!(
            "{:<16} {:<24} {:>6} {:>9.2}% {:>18} {:>7.2}x {:>6}",
            report.scenario_id,
            truncate(&report.scenario_name, 24),
            report.months_calculated,
            report.metrics.irr * 100.0,
            format_currency(report.metrics.npv),
            report.metrics.roi,
            report.health_score,
        );
    }
}

fn compare(config: EngineConfig, args: CompareArgs) -> Result<()> {
    let store = CsvScenarioStore::open(&args.data_dir, &config)
        .with_context(|| format!("loading scenarios from {}", args.data_dir.display()))?;
    let recalculator = Recalculator::new(config, store, NoSink, OfflineNarrative);

    let comparison = match (args.pivot, args.as_of.as_deref()) {
        (Some(pivot), _) => recalculator.compare_at(&args.scenario, pivot)?,
        (None, Some(as_of)) => recalculator.compare_with_actuals(&args.scenario, parse_date(as_of)?)?,
        (None, None) => {
            let today = chrono::Local::now().date_naive();
            recalculator.compare_with_actuals(&args.scenario, today)?
        }
    };

    let Some(comparison) = comparison else {
        println!("No projected or actual months for scenario {}", args.scenario);
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    let original = comparison.original_projections;
    let real_time = comparison.real_time_performance;
    println!("Scenario {}", args.scenario);
    println!("{:<12} {:>12} {:>12} {:>12}", "", "Projected", "Real-time", "Variance");
    println!(
        "{:<12} {:>11.2}% {:>11.2}% {:>11.2}%",
        "IRR",
        original.irr * 100.0,
        real_time.irr * 100.0,
        comparison.variance.irr_delta * 100.0
    );
    println!(
        "{:<12} {:>12.0} {:>12.0} {:>12.0}",
        "NPV", original.npv, real_time.npv, comparison.variance.npv_delta
    );
    println!("{:<12} {:>11.2}x {:>11.2}x", "ROI", original.roi, real_time.roi);

    if !comparison.missing_actual_months.is_empty() {
        println!(
            "\nNo actuals recorded for elapsed months {:?}; counted as zero",
            comparison.missing_actual_months
        );
    }
    Ok(())
}

/// Comparisons never persist anything
struct NoSink;

impl viability_engine::ReportSink for NoSink {
    fn store(&self, _report: &RecalculationReport) -> viability_engine::Result<()> {
        Ok(())
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}
