//! Pure reference functions behind the default cases.

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::error::CheckError;

/// Phrases rejected by [`is_blocked`], lowercase.
pub const BLOCKED_PHRASES: [&str; 3] = ["lorem ipsum", "do not use", "placeholder"];

/// Days between today and the next release window.
pub const RELEASE_WINDOW_DAYS: i64 = 14;

/// Largest index whose Fibonacci number fits in an `i64`.
pub const MAX_FIBONACCI_INDEX: u32 = 92;

pub fn sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, value| acc + value)
}

/// n-th Fibonacci number, 0-indexed. Saturates at `u64::MAX` on overflow.
pub fn fibonacci(n: u32) -> u64 {
    if n <= 1 {
        return u64::from(n);
    }
    let (mut prev, mut curr) = (0u64, 1u64);
    for _ in 2..=n {
        let next = prev.saturating_add(curr);
        prev = curr;
        curr = next;
    }
    curr
}

/// Lowercase, hyphen-separated form of `text` containing only `[a-z0-9-]`.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Midnight (UTC) of the calendar day containing `instant`.
pub fn truncate_to_date(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN))
}

pub fn add_days(date: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, CheckError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| CheckError::failed(format!("adding {days} days leaves the supported date range")))
}

/// Start of the release window counted from the day containing `now`.
pub fn release_window(now: DateTime<Utc>) -> Result<DateTime<Utc>, CheckError> {
    add_days(truncate_to_date(now), RELEASE_WINDOW_DAYS)
}

/// Case-insensitive containment of any block-listed phrase.
pub fn is_blocked(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BLOCKED_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

pub fn median(values: &[f64]) -> Result<f64, CheckError> {
    if values.is_empty() {
        return Err(CheckError::failed("Median requires at least one value"));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Ok(sorted[middle])
    }
}
