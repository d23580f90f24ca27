#[cfg(test)]
mod tests {
    use crate::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    // --- Formatter ---

    #[test]
    fn test_format_integral_numbers() {
        assert_eq!(format_value(&Value::Int(29)), "29");
        assert_eq!(format_value(&Value::Int(-7)), "-7");
        assert_eq!(format_value(&Value::Float(256.0)), "256");
        assert_eq!(format_value(&Value::Float(-3.0)), "-3");
        assert_eq!(format_value(&Value::Float(-0.0)), "0");
    }

    #[test]
    fn test_format_fractional_numbers() {
        assert_eq!(format_value(&Value::Float(1.5)), "1.500000");
        assert_eq!(format_value(&Value::Float(0.1 + 0.2)), "0.300000");
        assert_eq!(format_value(&Value::Float(-2.25)), "-2.250000");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_value(&Value::Float(f64::NAN)), "NaN");
        assert_eq!(format_value(&Value::Float(f64::INFINITY)), "Infinity");
        assert_eq!(format_value(&Value::Float(f64::NEG_INFINITY)), "-Infinity");
    }

    #[test]
    fn test_format_date() {
        let d = Utc.with_ymd_and_hms(2026, 11, 2, 0, 0, 0).unwrap();
        assert_eq!(format_value(&Value::Date(d)), "2026-11-02T00:00:00.000Z");
    }

    #[test]
    fn test_format_scalars() {
        assert_eq!(format_value(&Value::Text("agentic".into())), "agentic");
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_value(&Value::Bool(false)), "false");
        assert_eq!(format_value(&Value::Null), "null");
    }

    #[test]
    fn test_format_text_is_idempotent() {
        for s in ["", "plain", "  padded  ", "1.5", "true", "[1,2]"] {
            let once = format_value(&Value::Text(s.into()));
            let twice = format_value(&Value::Text(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_format_structured_as_compact_json() {
        let list = Value::List(vec![Value::Int(1), Value::Float(2.0), Value::Float(2.5), Value::Null]);
        assert_eq!(format_value(&list), "[1,2,2.5,null]");

        let mut entries = BTreeMap::new();
        entries.insert("b".to_string(), Value::Bool(true));
        entries.insert("a".to_string(), Value::Text("x".into()));
        assert_eq!(format_value(&Value::Map(entries)), r#"{"a":"x","b":true}"#);
    }

    #[test]
    fn test_format_nested_date_in_list() {
        let d = Utc.with_ymd_and_hms(2026, 1, 5, 12, 30, 0).unwrap();
        let list = Value::List(vec![Value::Date(d)]);
        assert_eq!(format_value(&list), r#"["2026-01-05T12:30:00.000Z"]"#);
    }

    // --- Comparator ---

    #[test]
    fn test_numeric_tolerance_boundary() {
        for a in [0.0, 1.0, -4.0, 29.0, 0.1, 123.456] {
            assert!(is_same_value(&Value::Float(a), &Value::Float(a + 5e-7)), "{a} within tolerance");
            assert!(!is_same_value(&Value::Float(a), &Value::Float(a + 2e-6)), "{a} outside tolerance");
        }
    }

    #[test]
    fn test_int_and_float_compare_numerically() {
        assert!(is_same_value(&Value::Int(4), &Value::Float(4.0)));
        assert!(is_same_value(&Value::Float(0.1 + 0.2), &Value::Float(0.3)));
        assert!(!is_same_value(&Value::Int(4), &Value::Int(5)));
    }

    #[test]
    fn test_mixed_types_compare_by_display_form() {
        // custom expectations are plain text
        assert!(is_same_value(&Value::Float(256.0), &Value::Text("256".into())));
        assert!(is_same_value(&Value::Bool(true), &Value::Text("true".into())));
        assert!(!is_same_value(&Value::Float(1.5), &Value::Text("1.5".into())));
        assert!(is_same_value(&Value::Float(1.5), &Value::Text("1.500000".into())));
        assert!(!is_same_value(&Value::Null, &Value::Text("".into())));
    }

    #[test]
    fn test_structured_values_compare_by_json() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Float(1.0), Value::Float(2.0)]);
        assert!(is_same_value(&a, &b));
        assert!(is_same_value(&a, &Value::Text("[1,2]".into())));
    }

    // --- Value helpers ---

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Text("hi".into())), "\"hi\"");
        assert_eq!(format!("{}", Value::Null), "null");
        assert_eq!(
            format!("{}", Value::List(vec![Value::Int(1), Value::Bool(false)])),
            "[1, false]"
        );
    }

    #[test]
    fn test_value_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::List(vec![]).is_truthy());
    }
}
