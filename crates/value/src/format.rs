use chrono::{DateTime, SecondsFormat, Utc};

use crate::value::Value;

/// Digits kept after the decimal point for non-integral numbers.
pub const FLOAT_DIGITS: usize = 6;

/// Canonical display string for a value.
///
/// Never fails: structured values that cannot be serialized fall back to
/// their `Display` form.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Date(d) => format_date(d),
        Value::Text(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::List(_) | Value::Map(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

/// Integral floats print as integers, everything else with fixed precision.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f.fract() == 0.0 {
        // -0.0 would otherwise print as "-0"
        if f == 0.0 {
            return "0".to_string();
        }
        return format!("{f:.0}");
    }
    format!("{f:.prec$}", prec = FLOAT_DIGITS)
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2026-11-02T00:00:00.000Z`.
pub fn format_date(d: &DateTime<Utc>) -> String {
    d.to_rfc3339_opts(SecondsFormat::Millis, true)
}
