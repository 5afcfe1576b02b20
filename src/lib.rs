//! Viability Engine - cash flow projection and return metrics for real-estate developments
//!
//! This library provides:
//! - Sales absorption and cost-curve scheduling (linear, logistic s-curve)
//! - Aggregation into a dense, calendar-anchored monthly cash flow series
//! - IRR / NPV / ROI metrics and a rule-based health score
//! - Feasibility vs monitoring: actuals spliced into projections with variance
//! - A recalculation pipeline over pluggable scenario sources and report sinks

pub mod config;
pub mod error;
pub mod scenario;
pub mod schedule;
pub mod projection;
pub mod metrics;
pub mod monitoring;
pub mod scoring;
pub mod narrative;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{Result, ViabilityError};
pub use scenario::{CostLineItem, DistributionCurve, Scenario, ScenarioInput, UnitGroup};
pub use schedule::{distribute, schedule_absorption, MonthlySequence};
pub use projection::{CashFlowSeries, CashflowRow, ProjectionEngine, ProjectionResult, ReportRow};
pub use metrics::{compute_metrics, Metrics, MetricsCalculator};
pub use monitoring::{compare, MonthlyFlows, ViabilityComparison};
pub use scoring::health_score;
pub use pipeline::{Recalculator, RecalculationReport, ReportSink, ScenarioSource};
