//! Fixed monthly model calendar
//!
//! The residual files carry a time coordinate that is not usable as-is, so the
//! time axis is replaced by a month-end calendar running from January 1920
//! through December 2100. Time index `0` is 1920-01-31.

use crate::errors::{NpgoError, Result};
use chrono::{Datelike, NaiveDate};
use std::ops::Range;

/// First year covered by the model output
pub const FIRST_YEAR: i32 = 1920;

/// Last year covered by the model output
pub const LAST_YEAR: i32 = 2100;

/// Number of monthly steps in the calendar
pub const N_MONTHS: usize = ((LAST_YEAR - FIRST_YEAR + 1) * 12) as usize;

/// Units string written on the output `time` variable
pub const TIME_UNITS: &str = "days since 1920-01-01 00:00:00";

/// Calendar attribute written on the output `time` variable
pub const TIME_CALENDAR: &str = "proleptic_gregorian";

/// Time index of a calendar month. `month` is 1-based.
///
/// The result may fall outside `0..N_MONTHS` for years off the calendar.
#[must_use]
pub fn month_index(year: i32, month: u32) -> i64 {
    (i64::from(year) - i64::from(FIRST_YEAR)) * 12 + i64::from(month) - 1
}

/// Year and 1-based month of a time index
#[must_use]
pub fn year_month(index: usize) -> (i32, u32) {
    let year = FIRST_YEAR + (index / 12) as i32;
    let month = (index % 12) as u32 + 1;
    (year, month)
}

/// Last day of the given month
#[must_use]
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// Month-end date stamped on a time index
#[must_use]
pub fn timestamp(index: usize) -> NaiveDate {
    let (year, month) = year_month(index);
    month_end(year, month)
}

/// Days between the calendar epoch and `date`
#[must_use]
pub fn days_since_epoch(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// Check that a file's time axis can take the monthly calendar.
///
/// # Errors
///
/// Returns [`NpgoError::CalendarMismatch`] if the length is not [`N_MONTHS`].
pub fn check_length(found: usize) -> Result<()> {
    if found != N_MONTHS {
        return Err(NpgoError::CalendarMismatch {
            expected: N_MONTHS,
            found,
        });
    }
    Ok(())
}

/// Time indices covering `[start_year-01, end_year-12]`, clipped to the calendar.
///
/// Mirrors label slicing: years outside the calendar simply select fewer
/// months, and an inverted range selects none.
#[must_use]
pub fn year_window(start_year: i32, end_year: i32) -> Range<usize> {
    let clip = |i: i64| i.clamp(0, N_MONTHS as i64) as usize;
    let start = clip(month_index(start_year, 1));
    let end = clip(month_index(end_year, 12) + 1);
    start..end.max(start)
}

/// Calendar months for the given time indices
#[must_use]
pub fn months_of(range: Range<usize>) -> Vec<NaiveDate> {
    range.map(timestamp).collect()
}

/// Whether a month-end date falls in January, February or March
#[must_use]
pub fn is_jfm(date: &NaiveDate) -> bool {
    date.month() <= 3
}
