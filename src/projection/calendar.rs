//! Calendar anchoring for projection months

use chrono::{Datelike, Duration, NaiveDate};

/// Days a projection month advances the base date by
pub const DAYS_PER_PROJECTION_MONTH: i64 = 30;

/// Reporting date for `month_index`: base date advanced by 30 days per month,
/// then moved to the first of the resulting calendar month.
///
/// Display only; the metrics never look at dates. Because months are 30-day
/// steps, two consecutive indices can land on the same calendar month.
pub fn month_date(base_date: NaiveDate, month_index: usize) -> NaiveDate {
    let days = DAYS_PER_PROJECTION_MONTH.saturating_mul(month_index as i64);
    let advanced = Duration::try_days(days)
        .and_then(|span| base_date.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX);
    first_of_month(advanced)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole calendar months from `start` to `as_of`, never negative.
///
/// The usual pivot month when splicing actuals into a projection.
pub fn months_elapsed(start: NaiveDate, as_of: NaiveDate) -> usize {
    let months = (as_of.year() - start.year()) * 12 + as_of.month() as i32 - start.month() as i32;
    usize::try_from(months.max(0)).unwrap_or(0)
}
