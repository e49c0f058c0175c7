// src/estimate/mod.rs

use chrono::{DateTime, Utc};

use crate::dataset::VaccinationRecord;
use crate::error::Result;
use crate::process::date_parser::known_good_instant;

pub const MINUTES_PER_DAY: f64 = 1440.0;
/// Per-million to per-hundred.
const PER_MILLION_TO_PER_HUNDRED: f64 = 10_000.0;

pub const PERCENT_PLACEHOLDER: &str = "--%";
pub const COUNT_PLACEHOLDER: &str = "Unknown";

/// Whole minutes from the end of `date` until `now`, floored. Negative
/// when `now` is earlier than that instant.
pub fn minutes_since_update(date: &str, now: DateTime<Utc>) -> Result<i64> {
    let since = now - known_good_instant(date)?;
    Ok(since.num_milliseconds().div_euclid(60_000))
}

/// Percentage points added per minute at a given daily per-million rate.
pub fn percentage_rate_per_minute(daily_per_million: u64) -> f64 {
    (daily_per_million as f64 / MINUTES_PER_DAY) / PER_MILLION_TO_PER_HUNDRED
}

/// People added per minute at a given daily rate.
pub fn people_rate_per_minute(daily: u64) -> f64 {
    daily as f64 / MINUTES_PER_DAY
}

/// Extrapolated `people_vaccinated_per_hundred`. `Ok(None)` when the record
/// lacks the known value or the rate; the date is only parsed when both exist.
pub fn estimate_per_hundred(record: &VaccinationRecord, now: DateTime<Utc>) -> Result<Option<f64>> {
    let (Some(known), Some(rate)) = (
        record.people_vaccinated_per_hundred,
        record.daily_vaccinations_per_million,
    ) else {
        return Ok(None);
    };
    let minutes = minutes_since_update(&record.date, now)?;
    Ok(Some(known + minutes as f64 * percentage_rate_per_minute(rate)))
}

/// Extrapolated `people_vaccinated`. The added term is computed in floating
/// point and truncated toward zero once; the sum saturates at the `i64`
/// bounds. A known count beyond `i64` has no estimate.
pub fn estimate_people(record: &VaccinationRecord, now: DateTime<Utc>) -> Result<Option<i64>> {
    let (Some(known), Some(rate)) = (record.people_vaccinated, record.daily_vaccinations) else {
        return Ok(None);
    };
    let Ok(known) = i64::try_from(known) else {
        return Ok(None);
    };
    let minutes = minutes_since_update(&record.date, now)?;
    // `as` saturates for out-of-range floats
    let added = (minutes as f64 * people_rate_per_minute(rate)).trunc() as i64;
    Ok(Some(known.saturating_add(added)))
}

/// `63.42%`, or `--%` when absent.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{:.2}%", pct),
        None => PERCENT_PLACEHOLDER.to_string(),
    }
}

/// `1,000,600`, or `Unknown` when absent.
pub fn format_count(value: Option<i64>) -> String {
    let Some(n) = value else {
        return COUNT_PLACEHOLDER.to_string();
    };
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
