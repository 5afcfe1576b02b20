//! Cashflow output structures for projections

use super::calendar::month_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Income, costs and net flow for one projection month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowRow {
    pub month_index: usize,
    pub income: f64,
    pub costs: f64,
    pub net: f64,
}

impl CashflowRow {
    pub fn new(month_index: usize, income: f64, costs: f64) -> Self {
        Self {
            month_index,
            income,
            costs,
            net: income - costs,
        }
    }
}

/// Dense monthly cash flow series, months 0..=max_month with no gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    rows: Vec<CashflowRow>,
}

impl CashFlowSeries {
    /// Build from per-month income and cost vectors. The shorter side is
    /// zero-extended so both cover the same months.
    pub fn from_components(income: &[f64], costs: &[f64]) -> Self {
        let months = income.len().max(costs.len());
        let rows = (0..months)
            .map(|m| {
                CashflowRow::new(
                    m,
                    income.get(m).copied().unwrap_or(0.0),
                    costs.get(m).copied().unwrap_or(0.0),
                )
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[CashflowRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_month(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    pub fn get(&self, month: usize) -> Option<&CashflowRow> {
        self.rows.get(month)
    }

    /// Net flow per month; the sole input to the metrics
    pub fn net_flows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.net).collect()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let total_income: f64 = self.rows.iter().map(|r| r.income).sum();
        let total_costs: f64 = self.rows.iter().map(|r| r.costs).sum();

        // Deepest point of the cumulative net position
        let mut cumulative = 0.0;
        let mut peak_funding = 0.0_f64;
        for row in &self.rows {
            cumulative += row.net;
            peak_funding = peak_funding.min(cumulative);
        }

        ProjectionSummary {
            total_months: self.rows.len(),
            total_income,
            total_costs,
            total_net: total_income - total_costs,
            peak_funding_requirement: -peak_funding,
        }
    }
}

/// Totals over a projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: usize,
    pub total_income: f64,
    pub total_costs: f64,
    pub total_net: f64,
    /// Largest cumulative cash shortfall, reported as a positive amount
    pub peak_funding_requirement: f64,
}

/// Projection of one scenario: the series plus its calendar anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario_id: String,
    pub base_date: NaiveDate,
    pub series: CashFlowSeries,
}

impl ProjectionResult {
    pub fn new(scenario_id: impl Into<String>, base_date: NaiveDate, series: CashFlowSeries) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            base_date,
            series,
        }
    }

    /// Calendar-dated rows for persistence
    pub fn report_rows(&self) -> Vec<ReportRow> {
        self.series
            .rows()
            .iter()
            .map(|row| ReportRow {
                month_index: row.month_index,
                calendar_date: month_date(self.base_date, row.month_index),
                income: row.income,
                costs: row.costs,
                net_flow: row.net,
            })
            .collect()
    }

    pub fn months_calculated(&self) -> usize {
        self.series.len()
    }
}

/// Calendar-dated monthly row handed to the report sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub month_index: usize,
    pub calendar_date: NaiveDate,
    pub income: f64,
    pub costs: f64,
    pub net_flow: f64,
}
