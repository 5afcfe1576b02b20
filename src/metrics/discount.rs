//! Discounting of monthly cash flow streams
//!
//! Rates are quoted as nominal annual rates and applied monthly
//! (`annual_rate / 12`).

use serde::{Deserialize, Serialize};

/// Flat discount rate for monthly flows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountRate {
    /// Nominal annual rate
    pub annual_rate: f64,
}

impl DiscountRate {
    pub fn annual(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }

    /// Net present value of `flows`, first flow undiscounted
    pub fn npv(&self, flows: &[f64]) -> f64 {
        npv_at_rate(flows, self.monthly_rate())
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        Self::annual(crate::config::DEFAULT_ANNUAL_DISCOUNT_RATE)
    }
}

/// NPV at a periodic rate: sum of `flow[t] / (1 + rate)^t`
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}
