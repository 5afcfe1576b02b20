//! Cash flow aggregation: many absorption and cost sequences into one series

use super::cashflows::{CashFlowSeries, ProjectionResult};
use crate::config::EngineConfig;
use crate::scenario::{CostLineItem, ScenarioInput, UnitGroup};
use crate::schedule::{distribute, schedule_absorption, MonthlySequence};
use chrono::NaiveDate;
use log::debug;

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: EngineConfig,
}

impl ProjectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Merge every unit group and cost item into one dense series.
    ///
    /// The series spans month 0 through the last month touched by any
    /// sequence, income or cost, so a long cost tail is never truncated by a
    /// short sales window (or the reverse). Months nothing touches are zero.
    ///
    /// A unit group with a zero sales velocity sells at the configured
    /// default velocity instead.
    pub fn aggregate(&self, units: &[UnitGroup], costs: &[CostLineItem]) -> CashFlowSeries {
        let mut max_month = 0;
        let mut income = Vec::new();
        let mut cost = Vec::new();

        for unit in units {
            let absorption = schedule_absorption(
                unit.unit_count,
                self.sales_velocity(unit),
                unit.sales_start_month_offset,
            );
            let revenue = absorption.scaled(unit.avg_price);
            accumulate(&mut income, &revenue);
            max_month = max_month.max(revenue.last_month().unwrap_or(0));
        }

        for item in costs {
            let spend = distribute(
                item.total_estimated,
                item.duration_months,
                item.start_month_offset,
                item.distribution_curve,
            );
            accumulate(&mut cost, &spend);
            max_month = max_month.max(spend.last_month().unwrap_or(0));
        }

        income.resize(max_month + 1, 0.0);
        cost.resize(max_month + 1, 0.0);

        debug!(
            "aggregated {} unit groups and {} cost items over {} months",
            units.len(),
            costs.len(),
            max_month + 1
        );

        CashFlowSeries::from_components(&income, &cost)
    }

    fn sales_velocity(&self, unit: &UnitGroup) -> f64 {
        if unit.sales_velocity_per_month == 0.0 {
            self.config.default_sales_velocity
        } else {
            unit.sales_velocity_per_month
        }
    }

    /// Project a scenario anchored at `base_date`
    pub fn project(&self, input: &ScenarioInput, base_date: NaiveDate) -> ProjectionResult {
        let series = self.aggregate(&input.units, &input.costs);
        ProjectionResult::new(input.scenario.id.clone(), base_date, series)
    }
}

/// Add `sequence` into the running per-month totals, growing them as needed
fn accumulate(totals: &mut Vec<f64>, sequence: &MonthlySequence) {
    if totals.len() < sequence.len() {
        totals.resize(sequence.len(), 0.0);
    }
    for (month, amount) in sequence.iter() {
        totals[month] += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_cost_items_with_gap() {
        let engine = ProjectionEngine::default();
        let costs = vec![
            CostLineItem::linear("Land", 300.0, 2, 0),
            CostLineItem::linear("Finishing", 400.0, 2, 5),
        ];

        let series = engine.aggregate(&[], &costs);

        // Last item ends at month 6
        assert_eq!(series.len(), 7);
        assert_eq!(series.net_flows(), vec![-150.0, -150.0, 0.0, 0.0, 0.0, -200.0, -200.0]);
        for month in 2..5 {
            let row = series.get(month).unwrap();
            assert_eq!(row.income, 0.0);
            assert_eq!(row.costs, 0.0);
            assert_eq!(row.net, 0.0);
        }
    }

    #[test]
    fn test_cost_tail_longer_than_sales() {
        let engine = ProjectionEngine::default();
        let units = vec![UnitGroup::new(4, 2.0, 1, 100.0)];
        let costs = vec![CostLineItem::linear("Build", 900.0, 9, 0)];

        let series = engine.aggregate(&units, &costs);
        assert_eq!(series.len(), 9);
        assert_eq!(series.get(1).unwrap().income, 200.0);
        assert_eq!(series.get(2).unwrap().income, 200.0);
        assert_eq!(series.get(8).unwrap().income, 0.0);
        assert_relative_eq!(series.get(8).unwrap().costs, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sales_tail_longer_than_costs() {
        let engine = ProjectionEngine::default();
        let units = vec![UnitGroup::new(6, 1.0, 3, 50.0)];
        let costs = vec![CostLineItem::linear("Land", 100.0, 1, 0)];

        let series = engine.aggregate(&units, &costs);
        assert_eq!(series.len(), 9);
        assert_eq!(series.net_flows(), vec![-100.0, 0.0, 0.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn test_overlapping_sequences_are_summed() {
        let engine = ProjectionEngine::default();
        let units = vec![UnitGroup::new(2, 1.0, 0, 10.0), UnitGroup::new(1, 1.0, 1, 5.0)];
        let costs = vec![
            CostLineItem::linear("A", 4.0, 2, 0),
            CostLineItem::linear("B", 6.0, 1, 1),
        ];

        let series = engine.aggregate(&units, &costs);
        let row = series.get(1).unwrap();
        assert_eq!(row.income, 15.0);
        assert_eq!(row.costs, 8.0);
        assert_eq!(row.net, 7.0);
    }

    #[test]
    fn test_totals_are_conserved() {
        let engine = ProjectionEngine::default();
        let units = vec![UnitGroup::new(25, 3.0, 10, 200_000.0)];
        let costs = vec![
            CostLineItem::linear("Land", 1_000_000.0, 1, 0),
            CostLineItem::s_curve("Construction", 3_000_000.0, 20, 2),
        ];

        let summary = engine.aggregate(&units, &costs).summary();
        assert_relative_eq!(summary.total_income, 5_000_000.0, max_relative = 1e-9);
        assert_relative_eq!(summary.total_costs, 4_000_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_no_inputs_yields_month_zero() {
        let series = ProjectionEngine::default().aggregate(&[], &[]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.net_flows(), vec![0.0]);
    }

    #[test]
    fn test_zero_duration_item_contributes_nothing() {
        let engine = ProjectionEngine::default();
        let costs = vec![
            CostLineItem::linear("Broken", 500.0, 0, 12),
            CostLineItem::linear("Land", 100.0, 1, 0),
        ];
        let series = engine.aggregate(&[], &costs);
        assert_eq!(series.len(), 1);
        assert_eq!(series.net_flows(), vec![-100.0]);
    }

    #[test]
    fn test_zero_velocity_sells_at_configured_default() {
        let config = EngineConfig {
            default_sales_velocity: 2.0,
            ..EngineConfig::default()
        };
        let units = vec![UnitGroup::new(5, 0.0, 1, 10.0)];

        let series = ProjectionEngine::new(config).aggregate(&units, &[]);
        assert_eq!(series.len(), 4);
        let income: Vec<f64> = series.rows().iter().map(|r| r.income).collect();
        assert_eq!(income, vec![0.0, 20.0, 20.0, 10.0]);

        // Default engine sells one unit a month
        assert_eq!(ProjectionEngine::default().aggregate(&units, &[]).len(), 6);
    }

    #[test]
    fn test_negative_velocity_sells_nothing() {
        let units = vec![UnitGroup::new(5, -1.0, 2, 10.0)];
        let costs = vec![CostLineItem::linear("Land", 30.0, 1, 0)];

        let series = ProjectionEngine::default().aggregate(&units, &costs);
        assert_eq!(series.summary().total_income, 0.0);
        // Only the zero lead-in remains
        assert_eq!(series.net_flows(), vec![-30.0, 0.0]);
    }

    #[test]
    fn test_project_keeps_scenario_anchor() {
        let base = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        let input = ScenarioInput::new(
            Scenario::new("tower-a", "Tower A", Some(base)),
            vec![UnitGroup::new(2, 1.0, 1, 10.0)],
            vec![CostLineItem::linear("Land", 15.0, 1, 0)],
        );

        let result = ProjectionEngine::default().project(&input, base);
        assert_eq!(result.scenario_id, "tower-a");
        assert_eq!(result.months_calculated(), 3);
        assert_eq!(result.report_rows()[0].calendar_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }
}
