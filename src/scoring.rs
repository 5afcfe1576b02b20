//! Project health score (0-100) from return metrics
//!
//! A rule table over three metric bands. It only reads [`Metrics`], so the
//! thresholds can be tuned without touching the engine.

use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};

/// Maximum score
pub const MAX_HEALTH_SCORE: u8 = 100;

/// Points awarded when a metric is strictly above a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub above: f64,
    pub points: u8,
}

const fn band(above: f64, points: u8) -> Band {
    Band { above, points }
}

/// Threshold tables, highest band first within each metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBands {
    pub irr: Vec<Band>,
    pub roi: Vec<Band>,
    pub npv: Vec<Band>,
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self {
            // Benchmark 15% annualized IRR
            irr: vec![band(0.25, 40), band(0.15, 30), band(0.08, 15)],
            // Benchmark 1.3x
            roi: vec![band(1.5, 30), band(1.25, 20), band(1.1, 10)],
            npv: vec![band(1_000_000.0, 30), band(0.0, 20)],
        }
    }
}

impl ScoreBands {
    /// Health score for `metrics`, capped at 100
    pub fn score(&self, metrics: &Metrics) -> u8 {
        let total = band_points(&self.irr, metrics.irr) as u32
            + band_points(&self.roi, metrics.roi) as u32
            + band_points(&self.npv, metrics.npv) as u32;
        total.min(MAX_HEALTH_SCORE as u32) as u8
    }
}

/// Points of the first band the value clears
fn band_points(bands: &[Band], value: f64) -> u8 {
    bands
        .iter()
        .find(|b| value > b.above)
        .map(|b| b.points)
        .unwrap_or(0)
}

/// Health score under the default rule table
pub fn health_score(metrics: &Metrics) -> u8 {
    ScoreBands::default().score(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(irr: f64, npv: f64, roi: f64) -> Metrics {
        Metrics { irr, npv, roi }
    }

    #[test]
    fn test_top_bands() {
        assert_eq!(health_score(&metrics(0.30, 2_000_000.0, 1.8)), 100);
    }

    #[test]
    fn test_middle_bands() {
        // 30 + 20 + 20
        assert_eq!(health_score(&metrics(0.20, 500_000.0, 1.3)), 70);
        // 15 + 10 + 20
        assert_eq!(health_score(&metrics(0.10, 1.0, 1.2)), 45);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(health_score(&metrics(0.08, 0.0, 1.1)), 0);
        assert_eq!(health_score(&metrics(0.25, 1_000_000.0, 1.5)), 30 + 20 + 20);
    }

    #[test]
    fn test_zero_metrics_score_zero() {
        assert_eq!(health_score(&Metrics::zero()), 0);
    }

    #[test]
    fn test_capped_at_max() {
        let generous = ScoreBands {
            irr: vec![band(0.0, 90)],
            roi: vec![band(0.0, 90)],
            npv: vec![],
        };
        assert_eq!(generous.score(&metrics(0.1, 0.0, 1.0)), MAX_HEALTH_SCORE);
    }
}
