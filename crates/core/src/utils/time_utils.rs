use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{Result, ValidationError};

/// Date format used on every external surface.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a UTC instant to its calendar date.
///
/// Crypto markets have no exchange timezone, so the UTC calendar day is the
/// single source of truth for bucketing trades and prices.
pub fn date_from_utc(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| ValidationError::DateTimeParse(e).into())
}

/// Parses an optional `YYYY-MM-DD` date, treating blank strings as absent.
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => parse_date(s).map(Some),
        _ => Ok(None),
    }
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

/// Rejects inverted ranges and ranges longer than `max_range_days` (when set).
pub fn validate_date_range(
    start: NaiveDate,
    end: NaiveDate,
    max_range_days: Option<i64>,
) -> Result<()> {
    if start > end {
        return Err(ValidationError::InvertedDateRange { start, end }.into());
    }
    if let Some(max) = max_range_days {
        let days = (end - start).num_days();
        if days > max {
            return Err(ValidationError::RangeTooLong { days, max }.into());
        }
    }
    Ok(())
}
