//! Hand-off to a strategic narrative generator
//!
//! The engine never depends on narrative text. It only packages the scenario
//! name, the metrics, and a short cost summary for whatever generator the
//! caller plugs in.

use crate::metrics::Metrics;
use crate::scenario::CostLineItem;
use serde::{Deserialize, Serialize};

/// Cost items included in the summary
pub const COST_SUMMARY_ITEMS: usize = 5;

/// Returned by [`OfflineNarrative`]
pub const OFFLINE_MESSAGE: &str = "Intelligence Engine currently offline. Please check API configuration.";

/// Everything a narrative generator receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub scenario_name: String,
    pub metrics: Metrics,
    /// `"<item>: $<amount>"` for the first few cost items, comma separated
    pub cost_summary: String,
}

impl NarrativeContext {
    pub fn new(scenario_name: impl Into<String>, metrics: Metrics, costs: &[CostLineItem]) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            metrics,
            cost_summary: cost_summary(costs),
        }
    }

    /// One-line metric brief, e.g. `IRR 18.40% | NPV $1,250,000.00 | ROI 1.42x`
    pub fn brief(&self) -> String {
        format!(
            "IRR {:.2}% | NPV {} | ROI {:.2}x",
            self.metrics.irr * 100.0,
            format_currency(self.metrics.npv),
            self.metrics.roi
        )
    }
}

/// Produces the strategic narrative for a recompute.
///
/// Failures are reported as text, never as errors, so a recompute can always
/// be persisted.
pub trait NarrativeGenerator: Send + Sync {
    fn strategic_analysis(&self, context: &NarrativeContext) -> String;
}

/// Generator used when no narrative service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNarrative;

impl NarrativeGenerator for OfflineNarrative {
    fn strategic_analysis(&self, _context: &NarrativeContext) -> String {
        OFFLINE_MESSAGE.to_string()
    }
}

/// Summary of the first [`COST_SUMMARY_ITEMS`] cost items
pub fn cost_summary(costs: &[CostLineItem]) -> String {
    costs
        .iter()
        .take(COST_SUMMARY_ITEMS)
        .map(|c| format!("{}: {}", c.item_name, format_currency(c.total_estimated)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a currency value as `$1,234.56`
pub fn format_currency(value: f64) -> String {
    let abs_value = value.abs();
    let mut dollars = abs_value.trunc() as i64;
    let mut cents = ((abs_value - abs_value.trunc()) * 100.0).round() as i64;
    if cents == 100 {
        dollars += 1;
        cents = 0;
    }

    // Add thousands separators
    let dollars_str = dollars.to_string();
    let mut result = String::new();
    for (i, c) in dollars_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let dollars_formatted: String = result.chars().rev().collect();

    if value < 0.0 && (dollars > 0 || cents > 0) {
        format!("-${}.{:02}", dollars_formatted, cents)
    } else {
        format!("${}.{:02}", dollars_formatted, cents)
    }
}
