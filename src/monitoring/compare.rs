//! Viability vs monitoring: splice actuals into a projection and re-measure

use super::MonthlyFlows;
use crate::metrics::{Metrics, MetricsCalculator};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Change from the original projection to the real-time recompute
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    pub irr_delta: f64,
    pub npv_delta: f64,
}

/// Metrics of the pure projection next to the actuals-spliced recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViabilityComparison {
    pub original_projections: Metrics,
    pub real_time_performance: Metrics,
    pub variance: Variance,
    /// Elapsed months (before the pivot) with no recorded actual; these were
    /// spliced in as zero
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_actual_months: Vec<usize>,
}

/// Series built for a comparison, exposed for reporting and tests
#[derive(Debug, Clone, PartialEq)]
pub struct SplicedSeries {
    pub projected: Vec<f64>,
    pub spliced: Vec<f64>,
    pub missing_actual_months: Vec<usize>,
}

/// Build the projected-only and spliced series over the union of months.
///
/// Months before `pivot_month` take the actual value (zero when not
/// recorded); months from the pivot on take the projection. Returns None
/// when neither map has any month.
pub fn splice(projected: &MonthlyFlows, actual: &MonthlyFlows, pivot_month: usize) -> Option<SplicedSeries> {
    let max_month = match (projected.max_month(), actual.max_month()) {
        (Some(p), Some(a)) => p.max(a),
        (Some(m), None) | (None, Some(m)) => m,
        (None, None) => return None,
    };
    let months = max_month + 1;

    let spliced = (0..months)
        .map(|m| if m < pivot_month { actual.get(m) } else { projected.get(m) })
        .collect();
    let missing_actual_months = (0..months.min(pivot_month))
        .filter(|&m| !actual.contains(m))
        .collect();

    Some(SplicedSeries {
        projected: projected.dense(months),
        spliced,
        missing_actual_months,
    })
}

/// Compare under the default metrics policy
pub fn compare(projected: &MonthlyFlows, actual: &MonthlyFlows, pivot_month: usize) -> Option<ViabilityComparison> {
    compare_with(&MetricsCalculator::default(), projected, actual, pivot_month)
}

/// Compare the pure projection with actuals spliced in before `pivot_month`
pub fn compare_with(
    calculator: &MetricsCalculator,
    projected: &MonthlyFlows,
    actual: &MonthlyFlows,
    pivot_month: usize,
) -> Option<ViabilityComparison> {
    let series = splice(projected, actual, pivot_month)?;

    if !series.missing_actual_months.is_empty() {
        warn!(
            "{} elapsed months have no recorded actuals and are treated as zero: {:?}",
            series.missing_actual_months.len(),
            series.missing_actual_months
        );
    }

    let original = calculator.compute(&series.projected);
    let real_time = calculator.compute(&series.spliced);

    debug!(
        "pivot {} over {} months: irr {:.4} -> {:.4}, npv {:.2} -> {:.2}",
        pivot_month,
        series.projected.len(),
        original.irr,
        real_time.irr,
        original.npv,
        real_time.npv
    );

    Some(ViabilityComparison {
        original_projections: original,
        real_time_performance: real_time,
        variance: Variance {
            irr_delta: real_time.irr - original.irr,
            npv_delta: real_time.npv - original.npv,
        },
        missing_actual_months: series.missing_actual_months,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calculator() -> MetricsCalculator {
        MetricsCalculator::default()
    }

    #[test]
    fn test_pivot_zero_is_pure_projection() {
        let projected = MonthlyFlows::from([(0, -1000.0), (1, 600.0), (2, 600.0)]);
        let actual = MonthlyFlows::from([(0, -1200.0), (1, 100.0)]);

        let series = splice(&projected, &actual, 0).unwrap();
        assert_eq!(series.spliced, series.projected);

        let comparison = compare_with(&calculator(), &projected, &actual, 0).unwrap();
        assert_eq!(comparison.variance, Variance { irr_delta: 0.0, npv_delta: 0.0 });
        assert_eq!(comparison.original_projections, comparison.real_time_performance);
        assert!(comparison.missing_actual_months.is_empty());
    }

    #[test]
    fn test_shortfall_lowers_irr_and_npv() {
        let projected = MonthlyFlows::from([(0, -1000.0), (1, 600.0), (2, 600.0)]);
        let actual = MonthlyFlows::from([(0, -1000.0), (1, 500.0)]);

        let series = splice(&projected, &actual, 2).unwrap();
        assert_eq!(series.spliced, vec![-1000.0, 500.0, 600.0]);
        assert_eq!(series.projected, vec![-1000.0, 600.0, 600.0]);

        let comparison = compare_with(&calculator(), &projected, &actual, 2).unwrap();
        assert!(comparison.variance.irr_delta < 0.0);
        assert!(comparison.variance.npv_delta < 0.0);

        // The 100 shortfall in month 1, discounted one month
        assert_relative_eq!(comparison.variance.npv_delta, -100.0 / (1.0 + 0.10 / 12.0), epsilon = 1e-9);
        assert_relative_eq!(
            comparison.variance.irr_delta,
            comparison.real_time_performance.irr - comparison.original_projections.irr
        );
    }

    #[test]
    fn test_missing_actuals_are_zero_and_reported() {
        let projected = MonthlyFlows::from([(0, -1000.0), (1, 400.0), (2, 400.0), (3, 400.0)]);
        let actual = MonthlyFlows::from([(0, -1000.0), (2, 450.0)]);

        let series = splice(&projected, &actual, 3).unwrap();
        assert_eq!(series.spliced, vec![-1000.0, 0.0, 450.0, 400.0]);
        assert_eq!(series.missing_actual_months, vec![1]);

        let comparison = compare_with(&calculator(), &projected, &actual, 3).unwrap();
        assert_eq!(comparison.missing_actual_months, vec![1]);
    }

    #[test]
    fn test_domain_is_union_of_months() {
        let projected = MonthlyFlows::from([(0, -100.0), (1, 60.0)]);
        let actual = MonthlyFlows::from([(3, 80.0)]);

        let series = splice(&projected, &actual, 4).unwrap();
        assert_eq!(series.projected, vec![-100.0, 60.0, 0.0, 0.0]);
        assert_eq!(series.spliced, vec![0.0, 0.0, 0.0, 80.0]);
    }

    #[test]
    fn test_pivot_past_domain_uses_only_actuals() {
        let projected = MonthlyFlows::from([(0, -100.0), (1, 150.0)]);
        let actual = MonthlyFlows::from([(0, -100.0), (1, 120.0)]);

        let comparison = compare_with(&calculator(), &projected, &actual, 10).unwrap();
        assert_relative_eq!(comparison.real_time_performance.roi, 1.2);
        assert_relative_eq!(comparison.original_projections.roi, 1.5);
    }

    #[test]
    fn test_empty_domain() {
        let empty = MonthlyFlows::new();
        assert!(splice(&empty, &empty, 3).is_none());
        assert!(compare(&empty, &empty, 3).is_none());
    }
}
