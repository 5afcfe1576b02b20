//! Investment return metrics over a monthly net cash flow series
//!
//! - IRR: monthly IRR annualized by simple scaling (monthly x 12)
//! - NPV: discounted at a flat nominal annual rate applied monthly
//! - ROI: total inflow over total outflow
//!
//! Metrics never fail. Undefined values (no sign change for IRR, no outflow
//! for ROI) are reported as 0 so a preview stays available for any shape.

mod irr;
mod discount;

pub use irr::periodic_irr;
pub use discount::{npv_at_rate, DiscountRate};

use crate::config::EngineConfig;
use log::warn;
use serde::{Deserialize, Serialize};

/// IRR / NPV / ROI triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Annualized IRR as a decimal fraction
    pub irr: f64,
    /// Net present value in currency units
    pub npv: f64,
    /// Total returned over total invested (multiple)
    pub roi: f64,
}

impl Metrics {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Computes [`Metrics`] under a given policy configuration
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    discount: DiscountRate,
    irr_annualization_factor: f64,
}

impl MetricsCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            discount: DiscountRate::annual(config.annual_discount_rate),
            irr_annualization_factor: config.irr_annualization_factor,
        }
    }

    pub fn compute(&self, net_flow: &[f64]) -> Metrics {
        if net_flow.is_empty() {
            return Metrics::zero();
        }

        let irr = periodic_irr(net_flow)
            .map(|monthly| monthly * self.irr_annualization_factor)
            .filter(|r| r.is_finite())
            .unwrap_or(0.0);
        let npv = self.discount.npv(net_flow);
        let roi = return_on_investment(net_flow);

        if !npv.is_finite() || !roi.is_finite() {
            warn!("non-finite metrics over {} months, reporting zero metrics", net_flow.len());
            return Metrics::zero();
        }

        Metrics { irr, npv, roi }
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// Metrics under the default policy (10% discount, x12 annualization)
pub fn compute_metrics(net_flow: &[f64]) -> Metrics {
    MetricsCalculator::default().compute(net_flow)
}

/// Sum of inflows divided by the absolute sum of outflows; 0 with no outflows
pub fn return_on_investment(net_flow: &[f64]) -> f64 {
    let invested: f64 = net_flow.iter().filter(|&&cf| cf < 0.0).sum::<f64>().abs();
    let returned: f64 = net_flow.iter().filter(|&&cf| cf > 0.0).sum();

    if invested > 0.0 {
        returned / invested
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(compute_metrics(&[]), Metrics { irr: 0.0, npv: 0.0, roi: 0.0 });
    }

    #[test]
    fn test_no_sign_change_irr_is_zero() {
        let metrics = compute_metrics(&[100.0, 100.0, 100.0]);
        assert_eq!(metrics.irr, 0.0);
        assert_eq!(metrics.roi, 0.0);
        assert!(metrics.npv > 0.0);
    }

    #[test]
    fn test_roi() {
        assert_relative_eq!(compute_metrics(&[-100.0, 150.0]).roi, 1.5);
        assert_eq!(compute_metrics(&[100.0, 50.0]).roi, 0.0);
        assert_relative_eq!(return_on_investment(&[-50.0, 20.0, -50.0, 250.0]), 2.7);
    }

    #[test]
    fn test_irr_is_simple_scaled() {
        let metrics = compute_metrics(&[-100.0, 110.0]);
        assert_relative_eq!(metrics.irr, 0.10 * 12.0, epsilon = 1e-7);
    }

    #[test]
    fn test_npv_uses_monthly_rate() {
        let metrics = compute_metrics(&[-100.0, 110.0]);
        assert_relative_eq!(metrics.npv, -100.0 + 110.0 / (1.0 + 0.10 / 12.0), epsilon = 1e-9);
    }

    #[test]
    fn test_custom_config() {
        let config = EngineConfig {
            annual_discount_rate: 0.0,
            irr_annualization_factor: 1.0,
            ..EngineConfig::default()
        };
        let metrics = MetricsCalculator::new(&config).compute(&[-100.0, 110.0]);
        assert_relative_eq!(metrics.npv, 10.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.irr, 0.10, epsilon = 1e-8);
    }

    #[test]
    fn test_non_finite_flows_degrade_to_zero() {
        assert_eq!(compute_metrics(&[-100.0, f64::INFINITY]), Metrics::zero());
        assert_eq!(compute_metrics(&[f64::NAN, 10.0]), Metrics::zero());
    }
}
