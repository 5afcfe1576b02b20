//! Feasibility vs monitoring
//!
//! Once a project is under way, realized monthly flows replace the projection
//! for elapsed months and the return metrics are recomputed on the blend.

mod flows;
mod compare;

pub use flows::{project_flows, MonthlyFlows};
pub use compare::{compare, compare_with, splice, SplicedSeries, Variance, ViabilityComparison};
