//! Load scenarios, unit mix, cost line items and actuals from CSV
//!
//! A data directory mirrors the tables the scenario records live in:
//! `scenarios.csv`, `units_mix.csv`, `cost_line_items.csv` and optionally
//! `actual_cashflow.csv`. Nullable columns are left empty.

use super::{CostLineItem, DistributionCurve, Scenario, ScenarioInput, UnitGroup, UNNAMED_SCENARIO};
use crate::config::EngineConfig;
use crate::error::{Result, ViabilityError};
use crate::monitoring::MonthlyFlows;
use crate::pipeline::ScenarioSource;
use chrono::NaiveDate;
use csv::Reader;
use log::{debug, warn};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const SCENARIOS_FILE: &str = "scenarios.csv";
pub const UNITS_FILE: &str = "units_mix.csv";
pub const COSTS_FILE: &str = "cost_line_items.csv";
pub const ACTUALS_FILE: &str = "actual_cashflow.csv";

/// Raw row of scenarios.csv
#[derive(Debug, serde::Deserialize)]
struct ScenarioRow {
    id: String,
    name: Option<String>,
    base_date: Option<String>,
}

impl ScenarioRow {
    fn to_scenario(self) -> Result<Scenario> {
        let base_date = match self.base_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_date(value)?),
        };
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNNAMED_SCENARIO.to_string());

        Ok(Scenario::new(self.id, name, base_date))
    }
}

/// Raw row of units_mix.csv
#[derive(Debug, serde::Deserialize)]
struct UnitRow {
    scenario_id: String,
    unit_count: Option<i64>,
    sales_velocity_per_month: Option<f64>,
    sales_start_month_offset: Option<i64>,
    avg_price: Option<f64>,
}

impl UnitRow {
    fn to_unit_group(self, default_velocity: f64) -> (String, UnitGroup) {
        let unit_count = self.unit_count.unwrap_or(0);
        if unit_count < 0 {
            warn!("scenario {}: negative unit_count {} treated as 0", self.scenario_id, unit_count);
        }

        // Absent and zero velocities both take the default
        let velocity = match self.sales_velocity_per_month {
            Some(v) if v != 0.0 => v,
            _ => default_velocity,
        };
        if velocity < 0.0 {
            warn!(
                "scenario {}: negative sales_velocity_per_month {}, unit group sells nothing",
                self.scenario_id, velocity
            );
        }

        let group = UnitGroup {
            unit_count: u32::try_from(unit_count.max(0)).unwrap_or(u32::MAX),
            sales_velocity_per_month: velocity,
            sales_start_month_offset: non_negative_offset(self.sales_start_month_offset),
            avg_price: self.avg_price.unwrap_or(0.0),
        };
        (self.scenario_id, group)
    }
}

/// Raw row of cost_line_items.csv
#[derive(Debug, serde::Deserialize)]
struct CostRow {
    scenario_id: String,
    item_name: Option<String>,
    total_estimated: Option<f64>,
    duration_months: Option<i64>,
    start_month_offset: Option<i64>,
    distribution_curve: Option<String>,
}

impl CostRow {
    fn to_cost_item(self) -> (String, CostLineItem) {
        // Absent and zero durations both mean one month; negative durations
        // produce an empty disbursement
        let duration_months = match self.duration_months {
            None | Some(0) => 1,
            Some(d) if d < 0 => {
                warn!(
                    "scenario {}: cost item {:?} has negative duration {}, no spend distributed",
                    self.scenario_id, self.item_name, d
                );
                0
            }
            Some(d) => u32::try_from(d).unwrap_or(u32::MAX),
        };

        let distribution_curve = self.curve();
        let item = CostLineItem {
            item_name: self.item_name.unwrap_or_default(),
            total_estimated: self.total_estimated.unwrap_or(0.0),
            duration_months,
            start_month_offset: non_negative_offset(self.start_month_offset),
            distribution_curve,
        };
        (self.scenario_id, item)
    }

    fn curve(&self) -> DistributionCurve {
        let Some(name) = self.distribution_curve.as_deref() else {
            return DistributionCurve::default();
        };
        let curve = DistributionCurve::parse(name);
        if curve.as_str() != name.trim() {
            warn!(
                "scenario {}: unknown distribution_curve {:?}, using {}",
                self.scenario_id,
                name,
                curve.as_str()
            );
        }
        curve
    }
}

/// Raw row of actual_cashflow.csv
#[derive(Debug, serde::Deserialize)]
struct ActualRow {
    scenario_id: String,
    month_index: usize,
    net_flow: f64,
}

fn non_negative_offset(value: Option<i64>) -> usize {
    usize::try_from(value.unwrap_or(0).max(0)).unwrap_or(0)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| ViabilityError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Load scenario descriptors from any reader
pub fn load_scenarios_from_reader<R: Read>(reader: R) -> Result<Vec<Scenario>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut scenarios = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ScenarioRow = result?;
        scenarios.push(row.to_scenario()?);
    }

    Ok(scenarios)
}

/// Load unit groups keyed by scenario id from any reader
pub fn load_units_from_reader<R: Read>(reader: R, config: &EngineConfig) -> Result<Vec<(String, UnitGroup)>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut units = Vec::new();

    for result in csv_reader.deserialize() {
        let row: UnitRow = result?;
        units.push(row.to_unit_group(config.default_sales_velocity));
    }

    Ok(units)
}

/// Load cost line items keyed by scenario id from any reader
pub fn load_costs_from_reader<R: Read>(reader: R) -> Result<Vec<(String, CostLineItem)>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut costs = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CostRow = result?;
        costs.push(row.to_cost_item());
    }

    Ok(costs)
}

/// Load actual monthly net flows keyed by scenario id from any reader.
/// Several rows for the same month are summed.
pub fn load_actuals_from_reader<R: Read>(reader: R) -> Result<HashMap<String, MonthlyFlows>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut actuals: HashMap<String, MonthlyFlows> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: ActualRow = result?;
        actuals.entry(row.scenario_id).or_default().add(row.month_index, row.net_flow);
    }

    Ok(actuals)
}

/// In-memory scenario store backed by a CSV data directory
#[derive(Debug, Clone, Default)]
pub struct CsvScenarioStore {
    root: PathBuf,
    scenarios: Vec<Scenario>,
    units: HashMap<String, Vec<UnitGroup>>,
    costs: HashMap<String, Vec<CostLineItem>>,
    actuals: HashMap<String, MonthlyFlows>,
}

impl CsvScenarioStore {
    /// Read every table in `dir`. Only scenarios.csv is required.
    pub fn open<P: AsRef<Path>>(dir: P, config: &EngineConfig) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();

        let scenarios = load_scenarios_from_reader(std::fs::File::open(root.join(SCENARIOS_FILE))?)?;

        let mut units: HashMap<String, Vec<UnitGroup>> = HashMap::new();
        if let Some(file) = open_optional(&root.join(UNITS_FILE))? {
            for (scenario_id, group) in load_units_from_reader(file, config)? {
                units.entry(scenario_id).or_default().push(group);
            }
        }

        let mut costs: HashMap<String, Vec<CostLineItem>> = HashMap::new();
        if let Some(file) = open_optional(&root.join(COSTS_FILE))? {
            for (scenario_id, item) in load_costs_from_reader(file)? {
                costs.entry(scenario_id).or_default().push(item);
            }
        }

        let actuals = match open_optional(&root.join(ACTUALS_FILE))? {
            Some(file) => load_actuals_from_reader(file)?,
            None => HashMap::new(),
        };

        debug!(
            "loaded {} scenarios from {} ({} with units, {} with costs, {} with actuals)",
            scenarios.len(),
            root.display(),
            units.len(),
            costs.len(),
            actuals.len()
        );

        Ok(Self {
            root,
            scenarios,
            units,
            costs,
            actuals,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scenario ids in file order
    pub fn scenario_ids(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.id.clone()).collect()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }
}

impl ScenarioSource for CsvScenarioStore {
    fn fetch(&self, scenario_id: &str) -> Result<Option<ScenarioInput>> {
        let Some(scenario) = self.scenarios.iter().find(|s| s.id == scenario_id) else {
            return Ok(None);
        };

        Ok(Some(ScenarioInput::new(
            scenario.clone(),
            self.units.get(scenario_id).cloned().unwrap_or_default(),
            self.costs.get(scenario_id).cloned().unwrap_or_default(),
        )))
    }

    fn fetch_actuals(&self, scenario_id: &str) -> Result<MonthlyFlows> {
        Ok(self.actuals.get(scenario_id).cloned().unwrap_or_default())
    }
}

fn open_optional(path: &Path) -> Result<Option<std::fs::File>> {
    match std::fs::File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not present, treating as empty", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
