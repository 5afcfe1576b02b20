//! Recalculation pipeline: fetch -> compute -> narrative -> persist
//!
//! Each scenario is one unit of work. The engine is stateless, so independent
//! scenarios run in parallel; recomputes of the same scenario are
//! last-write-wins at the sink.
//!
//! # Example
//! ```ignore
//! let config = EngineConfig::from_env();
//! let store = CsvScenarioStore::open("data/sample", &config)?;
//! let sink = CsvReportSink::new("out")?;
//! let recalculator = Recalculator::new(config, store, sink, OfflineNarrative);
//!
//! let report = recalculator.recalculate("tower-a")?;
//! println!("IRR {:.2}%", report.metrics.irr * 100.0);
//! ```

use crate::config::EngineConfig;
use crate::error::{Result, ViabilityError};
use crate::metrics::{Metrics, MetricsCalculator};
use crate::monitoring::{compare_with, project_flows, MonthlyFlows, ViabilityComparison};
use crate::narrative::{NarrativeContext, NarrativeGenerator};
use crate::projection::{months_elapsed, ProjectionEngine, ProjectionResult, ProjectionSummary, ReportRow};
use crate::scenario::ScenarioInput;
use crate::scoring::ScoreBands;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Where scenario inputs and recorded actuals come from
pub trait ScenarioSource: Send + Sync {
    /// Inputs for `scenario_id`, or None if no such scenario exists
    fn fetch(&self, scenario_id: &str) -> Result<Option<ScenarioInput>>;

    /// Recorded actual net flows by month; empty when none were recorded
    fn fetch_actuals(&self, scenario_id: &str) -> Result<MonthlyFlows>;
}

/// Where finished reports go. Storing replaces any earlier report for the
/// same scenario.
pub trait ReportSink: Send + Sync {
    fn store(&self, report: &RecalculationReport) -> Result<()>;
}

/// Outcome of one scenario recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub scenario_id: String,
    pub scenario_name: String,
    pub base_date: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub metrics: Metrics,
    pub summary: ProjectionSummary,
    pub health_score: u8,
    pub strategic_analysis: String,
    pub months_calculated: usize,
}

/// Runs the pipeline against pluggable collaborators
pub struct Recalculator<S, K, N> {
    engine: ProjectionEngine,
    calculator: MetricsCalculator,
    bands: ScoreBands,
    source: S,
    sink: K,
    narrative: N,
}

impl<S, K, N> Recalculator<S, K, N>
where
    S: ScenarioSource,
    K: ReportSink,
    N: NarrativeGenerator,
{
    pub fn new(config: EngineConfig, source: S, sink: K, narrative: N) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
            calculator: MetricsCalculator::new(&config),
            bands: ScoreBands::default(),
            source,
            sink,
            narrative,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Recompute and persist one scenario
    pub fn recalculate(&self, scenario_id: &str) -> Result<RecalculationReport> {
        let input = self.fetch(scenario_id)?;
        let base_date = resolve_base_date(&input);

        let projection = self.engine.project(&input, base_date);
        let metrics = self.calculator.compute(&projection.series.net_flows());
        let health_score = self.bands.score(&metrics);

        let context = NarrativeContext::new(input.scenario.name.clone(), metrics, &input.costs);
        let strategic_analysis = self.narrative.strategic_analysis(&context);

        let report = RecalculationReport {
            scenario_id: input.scenario.id.clone(),
            scenario_name: input.scenario.name.clone(),
            base_date,
            rows: projection.report_rows(),
            metrics,
            summary: projection.series.summary(),
            health_score,
            strategic_analysis,
            months_calculated: projection.months_calculated(),
        };

        self.sink.store(&report)?;

        info!(
            "scenario {} recalculated: {} months, irr {:.4}, npv {:.2}, roi {:.3}, score {}",
            report.scenario_id,
            report.months_calculated,
            metrics.irr,
            metrics.npv,
            metrics.roi,
            health_score
        );

        Ok(report)
    }

    /// Recompute many scenarios in parallel, one result per id in input order
    pub fn recalculate_all(&self, scenario_ids: &[String]) -> Vec<(String, Result<RecalculationReport>)> {
        scenario_ids
            .par_iter()
            .map(|id| (id.clone(), self.recalculate(id)))
            .collect()
    }

    /// Projection for a scenario without persisting anything
    pub fn project(&self, scenario_id: &str) -> Result<ProjectionResult> {
        let input = self.fetch(scenario_id)?;
        let base_date = resolve_base_date(&input);
        Ok(self.engine.project(&input, base_date))
    }

    /// Splice recorded actuals into the projection at the months elapsed
    /// between the base date and `as_of`
    pub fn compare_with_actuals(&self, scenario_id: &str, as_of: NaiveDate) -> Result<Option<ViabilityComparison>> {
        let projection = self.project(scenario_id)?;
        let pivot_month = months_elapsed(projection.base_date, as_of);
        self.compare_at_pivot(&projection, pivot_month)
    }

    /// Splice recorded actuals into the projection at an explicit pivot
    pub fn compare_at(&self, scenario_id: &str, pivot_month: usize) -> Result<Option<ViabilityComparison>> {
        let projection = self.project(scenario_id)?;
        self.compare_at_pivot(&projection, pivot_month)
    }

    fn compare_at_pivot(&self, projection: &ProjectionResult, pivot_month: usize) -> Result<Option<ViabilityComparison>> {
        let actual = self.source.fetch_actuals(&projection.scenario_id)?;
        debug!(
            "scenario {}: comparing {} actual months at pivot {}",
            projection.scenario_id,
            actual.len(),
            pivot_month
        );

        let projected = project_flows(&projection.series);
        Ok(compare_with(&self.calculator, &projected, &actual, pivot_month))
    }

    fn fetch(&self, scenario_id: &str) -> Result<ScenarioInput> {
        self.source
            .fetch(scenario_id)?
            .ok_or_else(|| ViabilityError::ScenarioNotFound(scenario_id.to_string()))
    }
}

fn resolve_base_date(input: &ScenarioInput) -> NaiveDate {
    input.scenario.base_date.unwrap_or_else(|| Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::{OfflineNarrative, OFFLINE_MESSAGE};
    use crate::scenario::{CostLineItem, Scenario, UnitGroup};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySource {
        inputs: HashMap<String, ScenarioInput>,
        actuals: HashMap<String, MonthlyFlows>,
    }

    impl ScenarioSource for MemorySource {
        fn fetch(&self, scenario_id: &str) -> Result<Option<ScenarioInput>> {
            Ok(self.inputs.get(scenario_id).cloned())
        }

        fn fetch_actuals(&self, scenario_id: &str) -> Result<MonthlyFlows> {
            Ok(self.actuals.get(scenario_id).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct MemorySink {
        stored: Mutex<HashMap<String, RecalculationReport>>,
    }

    impl ReportSink for MemorySink {
        fn store(&self, report: &RecalculationReport) -> Result<()> {
            self.stored
                .lock()
                .expect("sink lock")
                .insert(report.scenario_id.clone(), report.clone());
            Ok(())
        }
    }

    struct EchoNarrative;

    impl NarrativeGenerator for EchoNarrative {
        fn strategic_analysis(&self, context: &NarrativeContext) -> String {
            format!("{} | {}", context.scenario_name, context.cost_summary)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tower() -> ScenarioInput {
        ScenarioInput::new(
            Scenario::new("tower", "Tower A", Some(date(2024, 1, 15))),
            vec![UnitGroup::new(10, 2.0, 6, 300_000.0)],
            vec![
                CostLineItem::linear("Land", 800_000.0, 1, 0),
                CostLineItem::s_curve("Construction", 1_200_000.0, 8, 1),
            ],
        )
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source.inputs.insert("tower".to_string(), tower());
        source
    }

    #[test]
    fn test_recalculate_persists_report() {
        let recalculator = Recalculator::new(EngineConfig::default(), source(), MemorySink::default(), OfflineNarrative);

        let report = recalculator.recalculate("tower").unwrap();
        // Sales run months 6..=10, construction months 1..=8
        assert_eq!(report.months_calculated, 11);
        assert_eq!(report.rows.len(), 11);
        assert_eq!(report.rows[0].calendar_date, date(2024, 1, 1));
        assert_eq!(report.rows[0].net_flow, -800_000.0);
        assert!(report.metrics.irr > 0.0);
        assert!(report.metrics.roi > 1.0);
        assert_eq!(report.strategic_analysis, OFFLINE_MESSAGE);
        assert_eq!(report.health_score, ScoreBands::default().score(&report.metrics));

        let stored = recalculator.sink().stored.lock().unwrap();
        assert_eq!(stored.get("tower"), Some(&report));
    }

    #[test]
    fn test_narrative_receives_cost_summary() {
        let recalculator = Recalculator::new(EngineConfig::default(), source(), MemorySink::default(), EchoNarrative);
        let report = recalculator.recalculate("tower").unwrap();
        assert_eq!(
            report.strategic_analysis,
            "Tower A | Land: $800,000.00, Construction: $1,200,000.00"
        );
    }

    #[test]
    fn test_unknown_scenario() {
        let recalculator = Recalculator::new(EngineConfig::default(), source(), MemorySink::default(), OfflineNarrative);
        let err = recalculator.recalculate("nope").unwrap_err();
        assert!(matches!(err, ViabilityError::ScenarioNotFound(id) if id == "nope"));
        assert!(recalculator.sink().stored.lock().unwrap().is_empty());
    }

    #[test]
    fn test_recalculate_all_keeps_order() {
        let mut source = source();
        let mut second = tower();
        second.scenario.id = "tower-b".to_string();
        source.inputs.insert("tower-b".to_string(), second);

        let recalculator = Recalculator::new(EngineConfig::default(), source, MemorySink::default(), OfflineNarrative);
        let ids = vec!["tower".to_string(), "missing".to_string(), "tower-b".to_string()];
        let results = recalculator.recalculate_all(&ids);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "tower");
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        assert!(results[2].1.is_ok());
        assert_eq!(recalculator.sink().stored.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_compare_with_actuals() {
        let mut source = source();
        let projection = ProjectionEngine::default().project(&tower(), date(2024, 1, 15));
        let projected = projection.series.net_flows();

        // Construction ran 10% over budget in the first three months
        let actual: MonthlyFlows = (0..3)
            .map(|m| (m, if m == 0 { projected[m] } else { projected[m] * 1.1 }))
            .collect();
        source.actuals.insert("tower".to_string(), actual);

        let recalculator = Recalculator::new(EngineConfig::default(), source, MemorySink::default(), OfflineNarrative);

        // Three whole months after the January base date
        let comparison = recalculator
            .compare_with_actuals("tower", date(2024, 4, 20))
            .unwrap()
            .unwrap();
        assert!(comparison.variance.npv_delta < 0.0);
        assert!(comparison.variance.irr_delta < 0.0);
        assert!(comparison.missing_actual_months.is_empty());

        let unchanged = recalculator.compare_at("tower", 0).unwrap().unwrap();
        assert_eq!(unchanged.variance.irr_delta, 0.0);
        assert_eq!(unchanged.variance.npv_delta, 0.0);
    }
}
