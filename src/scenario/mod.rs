//! Scenario input records and CSV loading

mod data;
pub mod loader;

pub use data::{CostLineItem, DistributionCurve, Scenario, ScenarioInput, UnitGroup, UNNAMED_SCENARIO};
pub use loader::{parse_date, CsvScenarioStore};
