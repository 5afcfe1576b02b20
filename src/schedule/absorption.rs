//! Sales absorption: units sold per month from a velocity assumption

use super::MonthlySequence;

/// Units sold per month for a batch of `total_units` selling at `velocity`
/// units per month, starting at `start_offset`.
///
/// Each active month sells `min(remaining, velocity)`, so the final month
/// absorbs the remainder and the sequence sums to `total_units` exactly.
/// Velocity may be fractional. A non-positive velocity yields no active
/// months (only the zero lead-in); callers substitute a default velocity
/// before getting here.
pub fn schedule_absorption(total_units: u32, velocity: f64, start_offset: usize) -> MonthlySequence {
    if total_units == 0 {
        return MonthlySequence::empty();
    }

    let total = total_units as f64;
    let months = if velocity > 0.0 && velocity.is_finite() {
        (total / velocity).ceil() as usize
    } else {
        0
    };

    let mut remaining = total;
    let sold = (0..months).map(|_| {
        let units = remaining.min(velocity);
        remaining -= units;
        units
    });

    MonthlySequence::with_offset(start_offset, sold)
}
