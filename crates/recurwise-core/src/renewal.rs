//! Renewal projection
//!
//! Every function here takes the reference instant explicitly so results are
//! reproducible. A start date is compared against that instant as midnight
//! UTC of the day.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};
use crate::humanize::format_relative;
use crate::models::{Frequency, Renewal};

/// A renewal this close to the reference instant (inclusive) counts as urgent
pub const URGENT_WINDOW_DAYS: i64 = 7;

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// One billing period after `date`, clamping month/year steps to month end
fn advance(date: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => date.checked_add_signed(Duration::weeks(1)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
    }
}

/// First renewal strictly after `as_of`.
///
/// Steps one period at a time from the previous result, so a Jan 31 start
/// renews Feb 29, then Mar 29. A start date already after `as_of` is returned
/// unchanged; a start equal to `as_of` advances at least once.
pub fn next_renewal_date(
    start_date: NaiveDate,
    frequency: Frequency,
    as_of: DateTime<Utc>,
) -> Result<NaiveDate> {
    let mut next = start_date;
    while start_of_day(next) <= as_of {
        next = advance(next, frequency).ok_or_else(|| {
            Error::InvalidData(format!(
                "Renewal date after {} is out of range ({})",
                next, frequency
            ))
        })?;
    }
    Ok(next)
}

/// Relative label for a renewal date, with "today" and "tomorrow" shortcuts
pub fn format_renewal_label(next_date: NaiveDate, as_of: DateTime<Utc>) -> String {
    let relative = format_relative(start_of_day(next_date), as_of);
    match relative.as_str() {
        "in less than a minute" => "today".to_string(),
        "in 1 day" => "tomorrow".to_string(),
        _ => relative,
    }
}

fn within_urgent_window(next_date: NaiveDate, as_of: DateTime<Utc>) -> Result<bool> {
    let window_end = as_of
        .checked_add_signed(Duration::days(URGENT_WINDOW_DAYS))
        .ok_or_else(|| {
            Error::InvalidData(format!(
                "Urgency window after {} is out of range",
                as_of.to_rfc3339()
            ))
        })?;
    Ok(start_of_day(next_date) <= window_end)
}

/// Whether the next renewal falls within [`URGENT_WINDOW_DAYS`] of `as_of`
pub fn is_urgent(start_date: NaiveDate, frequency: Frequency, as_of: DateTime<Utc>) -> Result<bool> {
    let next = next_renewal_date(start_date, frequency, as_of)?;
    within_urgent_window(next, as_of)
}

/// Next date, label and urgency from a single projection
pub fn project(start_date: NaiveDate, frequency: Frequency, as_of: DateTime<Utc>) -> Result<Renewal> {
    let next_date = next_renewal_date(start_date, frequency, as_of)?;
    Ok(Renewal {
        next_date,
        label: format_renewal_label(next_date, as_of),
        urgent: within_urgent_window(next_date, as_of)?,
    })
}

/// Resolve a reference instant from user input.
///
/// Accepts RFC 3339 timestamps or `YYYY-MM-DD` (midnight UTC); `None` or an
/// empty string means `now`.
pub fn parse_as_of(input: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(now);
    };

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }

    Err(Error::InvalidData(format!(
        "Invalid as-of value: {} (use YYYY-MM-DD or an RFC 3339 timestamp)",
        raw
    )))
}
