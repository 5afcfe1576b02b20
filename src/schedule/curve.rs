//! Cost curve distribution: spread a lump-sum cost across months

use super::MonthlySequence;
use crate::scenario::DistributionCurve;

/// Sample domain for the logistic s-curve
const S_CURVE_DOMAIN: (f64, f64) = (-5.0, 5.0);

/// Spread `total_amount` over `duration_months` starting at `start_offset`.
///
/// A zero duration produces an empty sequence. Both shapes distribute exactly
/// `total_amount` (to floating-point precision).
pub fn distribute(
    total_amount: f64,
    duration_months: u32,
    start_offset: usize,
    shape: DistributionCurve,
) -> MonthlySequence {
    if duration_months == 0 {
        return MonthlySequence::empty();
    }

    let weights = match shape {
        DistributionCurve::Linear => linear_weights(duration_months as usize),
        DistributionCurve::SCurve => s_curve_weights(duration_months as usize),
    };

    MonthlySequence::with_offset(start_offset, weights.into_iter().map(|w| w * total_amount))
}

/// Equal monthly shares
fn linear_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Monthly shares of a logistic ramp sampled at `n` evenly spaced points.
///
/// The cumulative curve is the logistic at each point with an implicit zero
/// in front; the monthly share is its successive difference, renormalized to
/// sum to one because the logistic does not reach 0 and 1 on a finite window.
///
/// With two or more months, month 0 carries all of `logistic(-5)`, a fixed
/// `logistic(-5) / logistic(5)` (about 0.67%) of the total whatever the
/// duration. From 16 months on that exceeds month 1, so the shares dip once
/// before the ramp. The bell shape holds from month 1 onward.
fn s_curve_weights(n: usize) -> Vec<f64> {
    let cumulative: Vec<f64> = linspace(S_CURVE_DOMAIN.0, S_CURVE_DOMAIN.1, n)
        .map(logistic)
        .collect();

    let mut deltas = Vec::with_capacity(n);
    let mut previous = 0.0;
    for &y in &cumulative {
        deltas.push(y - previous);
        previous = y;
    }

    let sum: f64 = deltas.iter().sum();
    deltas.into_iter().map(|d| d / sum).collect()
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `n` evenly spaced points from `start` to `end` inclusive.
/// A single point sits at `start`.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}
