//! Recalculate every scenario in a data directory
//!
//! Projections run in parallel. Prints one summary line per scenario plus a
//! portfolio roll-up by calendar month, and writes the roll-up to CSV.
//!
//! Usage: batch_recalc [DATA_DIR] [OUTPUT_CSV]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::env;
use std::time::Instant;
use viability_engine::{
    narrative::format_currency,
    pipeline::ScenarioSource,
    projection::ProjectionResult,
    scenario::CsvScenarioStore,
    EngineConfig, MetricsCalculator, ProjectionEngine,
};

/// Portfolio totals for one calendar month
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
struct PortfolioRow {
    calendar_date: NaiveDate,
    scenarios: usize,
    income: f64,
    costs: f64,
    net_flow: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "data/sample".to_string());
    let output_path = args.next().unwrap_or_else(|| "portfolio_projection_output.csv".to_string());

    let start = Instant::now();
    let config = EngineConfig::from_env();
    let store = CsvScenarioStore::open(&data_dir, &config)
        .with_context(|| format!("loading scenarios from {}", data_dir))?;
    println!(
        "Loaded {} scenarios from {} in {:?}",
        store.scenarios().len(),
        store.root().display(),
        start.elapsed()
    );

    let engine = ProjectionEngine::new(config);
    let calculator = MetricsCalculator::new(&config);
    let today = chrono::Local::now().date_naive();

    println!("Running projections...");
    let proj_start = Instant::now();

    let ids = store.scenario_ids();
    let projections: Vec<(String, ProjectionResult)> = ids
        .par_iter()
        .map(|id| -> Result<Option<(String, ProjectionResult)>> {
            let Some(input) = store.fetch(id)? else {
                return Ok(None);
            };
            let base_date = input.scenario.base_date.unwrap_or(today);
            Ok(Some((input.scenario.name.clone(), engine.project(&input, base_date))))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    println!("Projections complete in {:?}\n", proj_start.elapsed());

    println!(
        "{:<16} {:<24} {:>6} {:>10} {:>18} {:>8} {:>18}",
        "Scenario", "Name", "Months", "IRR", "NPV", "ROI", "Peak Funding"
    );
    println!("{}", "-".repeat(106));

    let mut portfolio: BTreeMap<NaiveDate, PortfolioRow> = BTreeMap::new();
    for (name, projection) in &projections {
        let metrics = calculator.compute(&projection.series.net_flows());
        let summary = projection.series.summary();
        println!(
            "{:<16} {:<24} {:>6} {:>9.2}% {:>18} {:>7.2}x {:>18}",
            projection.scenario_id,
            name,
            projection.months_calculated(),
            metrics.irr * 100.0,
            format_currency(metrics.npv),
            metrics.roi,
            format_currency(summary.peak_funding_requirement),
        );

        for row in projection.report_rows() {
            let agg = portfolio.entry(row.calendar_date).or_insert_with(|| PortfolioRow {
                calendar_date: row.calendar_date,
                ..Default::default()
            });
            agg.scenarios += 1;
            agg.income += row.income;
            agg.costs += row.costs;
            agg.net_flow += row.net_flow;
        }
    }

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path))?;
    for row in portfolio.values() {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nPortfolio roll-up ({} months) written to {}", portfolio.len(), output_path);

    let mut cumulative = 0.0;
    let mut trough = 0.0_f64;
    for row in portfolio.values() {
        cumulative += row.net_flow;
        trough = trough.min(cumulative);
    }
    println!("\nPortfolio Summary:");
    println!("  Scenarios:      {}", projections.len());
    println!("  Net cash flow:  {}", format_currency(cumulative));
    println!("  Peak funding:   {}", format_currency(-trough));

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
