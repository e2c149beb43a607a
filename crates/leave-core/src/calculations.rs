use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{LeaveError, Result};
use crate::models::{LeaveRecord, LeaveRow, Month};

// ── Per-record metrics ────────────────────────────────────────────────────────

/// Number of weekdays (Mon–Fri) in the closed interval `[start, end]`.
///
/// Both endpoints count, matching [`compute_duration`]: a single weekday of
/// leave is one working day. Holidays are not considered.
///
/// # Errors
///
/// [`LeaveError::InvertedRange`] when `end < start`.
pub fn compute_working_days(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    let span = inclusive_days(start, end)?;

    let full_weeks = span / 7;
    let remainder = span % 7;

    // The trailing partial week starts on the same weekday as `start`.
    let mut weekday = start.weekday();
    let mut extra = 0;
    for _ in 0..remainder {
        if is_business_day(weekday) {
            extra += 1;
        }
        weekday = weekday.succ();
    }

    Ok(full_weeks * 5 + extra)
}

/// Inclusive calendar-day span `(end - start) + 1`, at least 1.
///
/// # Errors
///
/// [`LeaveError::InvertedRange`] when `end < start`; the value is never
/// clamped or passed through negative.
pub fn compute_duration(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    inclusive_days(start, end)
}

/// Calendar month of `date` with chronological ordering.
pub fn assign_month_order(date: NaiveDate) -> Month {
    // `month0()` is always 0..=11.
    Month::ALL[date.month0() as usize]
}

/// Validate `record` and attach its derived fields.
pub fn derive_row(record: LeaveRecord) -> Result<LeaveRow> {
    let working_days = compute_working_days(record.start_date, record.end_date)?;
    let leave_duration = compute_duration(record.start_date, record.end_date)?;
    let month = assign_month_order(record.start_date);
    Ok(LeaveRow {
        record,
        working_days,
        leave_duration,
        month,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_business_day(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
}

fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    if end < start {
        return Err(LeaveError::InvertedRange { start, end });
    }
    // A NaiveDate range is far below u32::MAX days.
    Ok((end - start).num_days() as u32 + 1)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
