//! Scenario input records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name used when a scenario record carries none
pub const UNNAMED_SCENARIO: &str = "Scenario Unnamed";

/// Shape used to spread a lump-sum cost over its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistributionCurve {
    /// Equal share every month
    #[default]
    #[serde(rename = "linear")]
    Linear,
    /// Logistic ramp-up / ramp-down (construction spend)
    #[serde(rename = "s-curve")]
    SCurve,
}

impl DistributionCurve {
    /// Parse a stored curve name. Unknown names fall back to linear.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "s-curve" => DistributionCurve::SCurve,
            _ => DistributionCurve::Linear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionCurve::Linear => "linear",
            DistributionCurve::SCurve => "s-curve",
        }
    }
}

/// Homogeneous batch of sellable units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitGroup {
    pub unit_count: u32,
    pub sales_velocity_per_month: f64,
    pub sales_start_month_offset: usize,
    pub avg_price: f64,
}

impl UnitGroup {
    pub fn new(unit_count: u32, sales_velocity_per_month: f64, sales_start_month_offset: usize, avg_price: f64) -> Self {
        Self {
            unit_count,
            sales_velocity_per_month,
            sales_start_month_offset,
            avg_price,
        }
    }

    /// Gross sales value if every unit sells at the average price
    pub fn gross_sales_value(&self) -> f64 {
        self.unit_count as f64 * self.avg_price
    }
}

/// One budget line (land, construction, marketing, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLineItem {
    pub item_name: String,
    pub total_estimated: f64,
    pub duration_months: u32,
    pub start_month_offset: usize,
    pub distribution_curve: DistributionCurve,
}

impl CostLineItem {
    pub fn new(
        item_name: impl Into<String>,
        total_estimated: f64,
        duration_months: u32,
        start_month_offset: usize,
        distribution_curve: DistributionCurve,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            total_estimated,
            duration_months,
            start_month_offset,
            distribution_curve,
        }
    }

    /// Convenience constructor for a linear line item
    pub fn linear(item_name: impl Into<String>, total: f64, duration_months: u32, start_month_offset: usize) -> Self {
        Self::new(item_name, total, duration_months, start_month_offset, DistributionCurve::Linear)
    }

    /// Convenience constructor for an s-curve line item
    pub fn s_curve(item_name: impl Into<String>, total: f64, duration_months: u32, start_month_offset: usize) -> Self {
        Self::new(item_name, total, duration_months, start_month_offset, DistributionCurve::SCurve)
    }
}

/// Scenario descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Month 0 of the projection. None means "today" at recompute time.
    pub base_date: Option<NaiveDate>,
}

impl Scenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_date: Option<NaiveDate>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_date,
        }
    }
}

/// Everything the engine needs to recompute one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub scenario: Scenario,
    pub units: Vec<UnitGroup>,
    pub costs: Vec<CostLineItem>,
}

impl ScenarioInput {
    pub fn new(scenario: Scenario, units: Vec<UnitGroup>, costs: Vec<CostLineItem>) -> Self {
        Self { scenario, units, costs }
    }

    pub fn total_budget(&self) -> f64 {
        self.costs.iter().map(|c| c.total_estimated).sum()
    }

    pub fn total_sales_value(&self) -> f64 {
        self.units.iter().map(UnitGroup::gross_sales_value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_parse_falls_back_to_linear() {
        assert_eq!(DistributionCurve::parse("s-curve"), DistributionCurve::SCurve);
        assert_eq!(DistributionCurve::parse("linear"), DistributionCurve::Linear);
        assert_eq!(DistributionCurve::parse("bell"), DistributionCurve::Linear);
        assert_eq!(DistributionCurve::parse(""), DistributionCurve::Linear);

        for curve in [DistributionCurve::Linear, DistributionCurve::SCurve] {
            assert_eq!(DistributionCurve::parse(curve.as_str()), curve);
        }
    }

    #[test]
    fn test_input_totals() {
        let input = ScenarioInput::new(
            Scenario::new("s1", "Tower A", None),
            vec![UnitGroup::new(10, 2.0, 0, 250_000.0), UnitGroup::new(4, 1.0, 6, 400_000.0)],
            vec![CostLineItem::linear("Land", 1_000_000.0, 1, 0), CostLineItem::s_curve("Build", 2_000_000.0, 18, 2)],
        );
        assert_eq!(input.total_budget(), 3_000_000.0);
        assert_eq!(input.total_sales_value(), 4_100_000.0);
    }
}
