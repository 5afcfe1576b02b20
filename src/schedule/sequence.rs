//! Month-indexed amount sequences produced by the schedulers

use serde::{Deserialize, Serialize};

/// Amounts indexed by month offset from the scenario base date.
///
/// Entries before `start_offset` are always zero; the active window runs from
/// `start_offset` to the end of the sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySequence {
    start_offset: usize,
    values: Vec<f64>,
}

impl MonthlySequence {
    /// Sequence with no months at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Zero-filled lead-in of `start_offset` months followed by `active`
    pub fn with_offset(start_offset: usize, active: impl IntoIterator<Item = f64>) -> Self {
        let mut values = vec![0.0; start_offset];
        values.extend(active);
        Self { start_offset, values }
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last month index covered, if any
    pub fn last_month(&self) -> Option<usize> {
        self.values.len().checked_sub(1)
    }

    /// Amount in `month`, zero outside the sequence
    pub fn get(&self, month: usize) -> f64 {
        self.values.get(month).copied().unwrap_or(0.0)
    }

    /// Months from `start_offset` onwards
    pub fn active(&self) -> &[f64] {
        self.values.get(self.start_offset..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// (month, amount) pairs over the whole sequence
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().copied().enumerate()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Every entry multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            start_offset: self.start_offset,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }
}
