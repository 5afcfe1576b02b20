//! Projection of a scenario into a dated monthly cash flow series

mod engine;
mod cashflows;
mod calendar;

pub use engine::ProjectionEngine;
pub use cashflows::{CashFlowSeries, CashflowRow, ProjectionResult, ProjectionSummary, ReportRow};
pub use calendar::{first_of_month, month_date, months_elapsed, DAYS_PER_PROJECTION_MONTH};
