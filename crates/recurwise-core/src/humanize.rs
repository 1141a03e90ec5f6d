//! Relative-time phrases ("in 3 days", "about 1 hour ago")
//!
//! Distances are bucketed the way common date libraries phrase "distance to
//! now": minutes up to three quarters of an hour, then approximate hours,
//! days, months and years. All arithmetic is in UTC.

use chrono::{DateTime, Datelike, Months, Utc};

const MINUTES_IN_HOUR: i64 = 60;
const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Round half up, matching how the buckets were defined
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn units(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Whole calendar months from `earlier` to `later` (end-of-month clamped)
fn whole_months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = (later.year() - earlier.year()) as i64 * 12 + later.month() as i64
        - earlier.month() as i64;

    while months > 0 {
        match earlier.checked_add_months(Months::new(months as u32)) {
            Some(shifted) if shifted <= later => break,
            _ => months -= 1,
        }
    }

    months.max(0)
}

/// Describe the distance between two instants without direction
pub fn format_distance(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
    let seconds = (later - earlier).num_seconds();
    let minutes = round_half_up(seconds as f64 / 60.0);

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            units(minutes, "minute")
        };
    }
    if minutes < 45 {
        return units(minutes, "minute");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = round_half_up(minutes as f64 / MINUTES_IN_HOUR as f64);
        return format!("about {}", units(hours, "hour"));
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = round_half_up(minutes as f64 / MINUTES_IN_DAY as f64);
        return units(days, "day");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = round_half_up(minutes as f64 / MINUTES_IN_MONTH as f64);
        return format!("about {}", units(months, "month"));
    }

    let months = whole_months_between(earlier, later);
    if months < 12 {
        let nearest = round_half_up(minutes as f64 / MINUTES_IN_MONTH as f64);
        return units(nearest, "month");
    }

    let years = months / 12;
    let remainder = months % 12;
    if remainder < 3 {
        format!("about {}", units(years, "year"))
    } else if remainder < 9 {
        format!("over {}", units(years, "year"))
    } else {
        format!("almost {}", units(years + 1, "year"))
    }
}

/// Describe `target` relative to `base`: "in 3 days" or "3 days ago"
pub fn format_relative(target: DateTime<Utc>, base: DateTime<Utc>) -> String {
    let distance = format_distance(target, base);
    if target > base {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}
