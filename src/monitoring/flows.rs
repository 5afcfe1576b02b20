//! Sparse month-indexed flows with defined-zero-elsewhere reads

use crate::projection::CashFlowSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net flow per month, sparse.
///
/// Reads of a month with no entry return 0. Note that this makes an absent
/// month indistinguishable from a recorded zero; use [`MonthlyFlows::contains`]
/// where the difference matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyFlows {
    by_month: BTreeMap<usize, f64>,
}

impl MonthlyFlows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount for `month`, zero when nothing was recorded
    pub fn get(&self, month: usize) -> f64 {
        self.by_month.get(&month).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, month: usize) -> bool {
        self.by_month.contains_key(&month)
    }

    /// Replace the amount recorded for `month`
    pub fn set(&mut self, month: usize, amount: f64) {
        self.by_month.insert(month, amount);
    }

    /// Add to the amount recorded for `month`
    pub fn add(&mut self, month: usize, amount: f64) {
        *self.by_month.entry(month).or_insert(0.0) += amount;
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }

    /// Highest month with an entry
    pub fn max_month(&self) -> Option<usize> {
        self.by_month.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.by_month.iter().map(|(&m, &v)| (m, v))
    }

    /// Dense values for months `0..months`, gaps zero-filled
    pub fn dense(&self, months: usize) -> Vec<f64> {
        (0..months).map(|m| self.get(m)).collect()
    }
}

impl FromIterator<(usize, f64)> for MonthlyFlows {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        let mut flows = Self::new();
        for (month, amount) in iter {
            flows.add(month, amount);
        }
        flows
    }
}

impl<const N: usize> From<[(usize, f64); N]> for MonthlyFlows {
    fn from(entries: [(usize, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Projected month -> net mapping for a projection series
pub fn project_flows(series: &CashFlowSeries) -> MonthlyFlows {
    series.rows().iter().map(|row| (row.month_index, row.net)).collect()
}
