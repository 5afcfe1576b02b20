//! Engine policy constants and their runtime configuration

use serde::{Deserialize, Serialize};
use std::env;

// ============================================================================
// Default Policy Constants
// ============================================================================
// - NPV discounts monthly flows at annual_discount_rate / 12
// - IRR is annualized by simple scaling of the monthly rate, not compounding
// - Unit groups without a usable sales velocity sell one unit per month

/// Default nominal annual discount rate for NPV (10%)
pub const DEFAULT_ANNUAL_DISCOUNT_RATE: f64 = 0.10;

/// Default multiplier applied to the monthly IRR
pub const DEFAULT_IRR_ANNUALIZATION_FACTOR: f64 = 12.0;

/// Default units sold per month when a record carries no velocity
pub const DEFAULT_SALES_VELOCITY: f64 = 1.0;

/// Policy knobs for a recompute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nominal annual discount rate for NPV
    pub annual_discount_rate: f64,

    /// Monthly IRR is multiplied by this to report an annual figure
    pub irr_annualization_factor: f64,

    /// Substituted for absent or zero sales velocities
    pub default_sales_velocity: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            annual_discount_rate: DEFAULT_ANNUAL_DISCOUNT_RATE,
            irr_annualization_factor: DEFAULT_IRR_ANNUALIZATION_FACTOR,
            default_sales_velocity: DEFAULT_SALES_VELOCITY,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment:
    ///   ANNUAL_DISCOUNT_RATE, IRR_ANNUALIZATION_FACTOR, DEFAULT_SALES_VELOCITY
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            annual_discount_rate: env_f64("ANNUAL_DISCOUNT_RATE")
                .unwrap_or(defaults.annual_discount_rate),
            irr_annualization_factor: env_f64("IRR_ANNUALIZATION_FACTOR")
                .unwrap_or(defaults.irr_annualization_factor),
            default_sales_velocity: env_f64("DEFAULT_SALES_VELOCITY")
                .filter(|v| *v > 0.0)
                .unwrap_or(defaults.default_sales_velocity),
        }
    }

    /// Load from a JSON file; fields left out keep their defaults
    pub fn from_json_path(path: &std::path::Path) -> crate::Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Monthly rate used for discounting
    pub fn monthly_discount_rate(&self) -> f64 {
        self.annual_discount_rate / 12.0
    }

    pub fn with_discount_rate(mut self, annual_rate: f64) -> Self {
        self.annual_discount_rate = annual_rate;
        self
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
