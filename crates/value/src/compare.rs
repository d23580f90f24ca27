use crate::format::format_value;
use crate::value::Value;

/// Absolute tolerance for numeric comparison.
pub const TOLERANCE: f64 = 1e-6;

/// Decide whether `actual` matches `expected`.
///
/// Two numbers match within [`TOLERANCE`]. Anything else matches when the
/// canonical display strings are identical, so what is shown is what is compared.
pub fn is_same_value(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => (a - b).abs() < TOLERANCE,
        _ => format_value(actual) == format_value(expected),
    }
}
