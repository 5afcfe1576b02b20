//! Internal Rate of Return (IRR) calculation
//!
//! Solves for the periodic rate at which the net present value of a cash flow
//! stream is zero. Index 0 is time 0.

use super::discount::npv_at_rate;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Periodic rates searched by the solver
const RATE_FLOOR: f64 = -0.99;
const RATE_CAP: f64 = 10.0;

/// Calculate the periodic IRR of a series of cash flows using Newton-Raphson,
/// falling back to bisection when Newton stalls.
///
/// # Arguments
/// * `cashflows` - Cash flows per period (positive = inflow, negative = outflow)
///
/// # Returns
/// * `Option<f64>` - Periodic IRR as a decimal, or None if the stream has no
///   sign change or no root lies within [-0.99, 10]
pub fn periodic_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() || cashflows.iter().any(|cf| !cf.is_finite()) {
        return None;
    }

    // Check if all cashflows are zero
    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // At least one sign change is required for an IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = 0.01;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            return irr_bisection(cashflows);
        }

        let new_rate = (rate - npv / dnpv).clamp(RATE_FLOOR, RATE_CAP);

        if (new_rate - rate).abs() < TOLERANCE {
            // A step pinned at a bound stops moving without reaching a root
            let at_bound = new_rate <= RATE_FLOOR || new_rate >= RATE_CAP;
            if at_bound && npv.abs() > residual_tolerance(cashflows) {
                return irr_bisection(cashflows);
            }
            return Some(new_rate).filter(|r| r.is_finite());
        }

        rate = new_rate;
    }

    irr_bisection(cashflows)
}

/// Largest NPV still accepted as zero, relative to the stream's size
fn residual_tolerance(cashflows: &[f64]) -> f64 {
    let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    1e-9 * scale.max(1.0)
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Fallback IRR using bisection over the searched rate range
fn irr_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = RATE_FLOOR;
    let mut high = RATE_CAP;

    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    // No root bracketed
    if npv_low * npv_high > 0.0 || !npv_low.is_finite() || !npv_high.is_finite() {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}
