#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::case::{Expected, TestCase, TestResult, NOT_COMPUTED};
    use crate::checks;
    use crate::error::CheckError;
    use crate::registry::{active_cases, custom_case, default_cases, CustomInputs, CUSTOM_CASE_ID};
    use crate::report::{render, summarize};
    use crate::runner::{Runner, UNKNOWN_ERROR};
    use playground_value::Value;

    fn result(label: &str, passed: bool, duration_ms: f64, error: Option<&str>) -> TestResult {
        TestResult {
            id: label.to_lowercase(),
            label: label.into(),
            expected: "4".into(),
            actual: if error.is_some() { NOT_COMPUTED.into() } else { "4".into() },
            passed,
            duration_ms,
            error: error.map(str::to_string),
        }
    }

    // --- Check library ---

    #[test]
    fn test_sum() {
        assert_eq!(checks::sum(&[3.0, 5.0, 8.0, 13.0]), 29.0);
        assert_eq!(checks::sum(&[]), 0.0);
    }

    #[test]
    fn test_fibonacci() {
        assert_eq!(checks::fibonacci(0), 0);
        assert_eq!(checks::fibonacci(1), 1);
        assert_eq!(checks::fibonacci(2), 1);
        assert_eq!(checks::fibonacci(10), 55);
        assert_eq!(checks::fibonacci(checks::MAX_FIBONACCI_INDEX), 7_540_113_804_746_346_429);
        assert_eq!(checks::fibonacci(200), u64::MAX);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(checks::slugify(" Agentic Test Playground "), "agentic-test-playground");
        assert_eq!(checks::slugify("Agentic Test Playground"), "agentic-test-playground");
        assert_eq!(checks::slugify("--Hello,   World!!--"), "hello-world");
        assert_eq!(checks::slugify("Crème brûlée 2"), "cr-me-br-l-e-2");
        assert_eq!(checks::slugify("  !!!  "), "");
    }

    #[test]
    fn test_is_blocked() {
        assert!(checks::is_blocked("contains LOREM IPSUM text"));
        assert!(checks::is_blocked("Do Not Use this"));
        assert!(checks::is_blocked("a placeholder"));
        assert!(!checks::is_blocked("red fox"));
        assert!(!checks::is_blocked(""));
    }

    #[test]
    fn test_median() {
        assert_eq!(checks::median(&[4.0, 1.0, 10.0, 8.0, 3.0]).unwrap(), 4.0);
        assert_eq!(checks::median(&[1.0, 2.0]).unwrap(), 1.5);
        assert_eq!(checks::median(&[7.0]).unwrap(), 7.0);
        assert_eq!(
            checks::median(&[]),
            Err(CheckError::Failed("Median requires at least one value".into()))
        );
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let values = [3.0, 1.0, 2.0];
        checks::median(&values).unwrap();
        assert_eq!(values, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_release_window_truncates_time_of_day() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 17, 45, 12).unwrap();
        assert_eq!(
            checks::truncate_to_date(now),
            Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()
        );
        assert_eq!(
            checks::release_window(now).unwrap(),
            Utc.with_ymd_and_hms(2026, 11, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_add_days_out_of_range() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(checks::add_days(now, i64::MAX).is_err());
        assert_eq!(
            checks::add_days(now, -1).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()
        );
    }

    // --- Registry ---

    #[test]
    fn test_default_case_order() {
        let ids: Vec<_> = default_cases().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["sum", "fibonacci", "slugify", "date-window", "guard-phrase", "median"]);
    }

    #[test]
    fn test_date_window_expectation_is_deferred() {
        let cases = default_cases();
        let date_case = cases.iter().find(|c| c.id() == "date-window").unwrap();
        assert!(matches!(date_case.expected(), Expected::Deferred(_)));
        assert!(matches!(date_case.expected().resolve(), Value::Date(_)));
    }

    #[test]
    fn test_custom_case_requires_label_and_expression() {
        assert!(custom_case(&CustomInputs::new("", "1 + 1", "2")).is_none());
        assert!(custom_case(&CustomInputs::new("label", "   ", "2")).is_none());
        assert!(custom_case(&CustomInputs::new("  \t", "1", "1")).is_none());
        assert!(custom_case(&CustomInputs::new("label", "1", "")).is_some());
    }

    #[test]
    fn test_custom_case_trims_label_and_expected() {
        let case = custom_case(&CustomInputs::new("  two  ", "1 + 1", "  2 ")).unwrap();
        assert_eq!(case.id(), CUSTOM_CASE_ID);
        assert_eq!(case.label(), "two");
        assert_eq!(case.expected().resolve(), Value::Text("2".into()));
    }

    #[test]
    fn test_active_cases_append_custom_last() {
        let cases = active_cases(&CustomInputs::starter());
        assert_eq!(cases.len(), 7);
        assert_eq!(cases[6].id(), CUSTOM_CASE_ID);
        assert_eq!(cases[6].label(), "2^8 equals 256");

        assert_eq!(active_cases(&CustomInputs::default()).len(), 6);
    }

    // --- Runner ---

    #[tokio::test]
    async fn test_defaults_all_pass_in_order() {
        let cases = default_cases();
        let results = Runner::new().run_all(&cases).await;
        assert_eq!(results.len(), 6);
        for (case, result) in cases.iter().zip(&results) {
            assert_eq!(case.id(), result.id);
            assert!(result.passed, "{} failed: {:?}", result.id, result);
            assert!(result.error.is_none());
            assert!(result.duration_ms >= 0.0);
        }
        assert_eq!(results[0].expected, "29");
        assert_eq!(results[0].actual, "29");
        assert_eq!(results[4].actual, "true");
    }

    #[tokio::test]
    async fn test_failing_case_is_isolated() {
        let cases = vec![
            TestCase::immediate("median-empty", "Median of []", Expected::Literal(Value::Int(0)), || {
                checks::median(&[]).map(Value::Float)
            }),
            TestCase::immediate("ok", "Always 1", Expected::Literal(Value::Int(1)), || Ok(Value::Int(1))),
        ];
        let results = Runner::new().run_all(&cases).await;
        assert_eq!(results.len(), 2);

        assert!(!results[0].passed);
        assert_eq!(results[0].actual, NOT_COMPUTED);
        assert_eq!(results[0].expected, "0");
        assert_eq!(results[0].error.as_deref(), Some("Median requires at least one value"));

        assert!(results[1].passed);
        assert!(results[1].error.is_none());
    }

    #[tokio::test]
    async fn test_panics_become_failed_results() {
        let cases = vec![
            TestCase::immediate("boom", "panics", Expected::Literal(Value::Null), || panic!("boom")),
            TestCase::immediate("opaque", "panics without text", Expected::Literal(Value::Null), || {
                std::panic::panic_any(42_u8)
            }),
            TestCase::immediate("silent", "empty error", Expected::Literal(Value::Null), || {
                Err(CheckError::failed(""))
            }),
            TestCase::immediate("after", "still runs", Expected::Literal(Value::Null), || Ok(Value::Null)),
        ];
        let results = Runner::new().run_all(&cases).await;
        assert_eq!(results[0].error.as_deref(), Some("boom"));
        assert_eq!(results[1].error.as_deref(), Some(UNKNOWN_ERROR));
        assert_eq!(results[2].error.as_deref(), Some(UNKNOWN_ERROR));
        assert!(results[3].passed);
    }

    #[tokio::test]
    async fn test_deferred_run_is_awaited_and_timed() {
        let case = TestCase::deferred("slow", "slow value", Expected::Literal(Value::Int(7)), || async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(Value::Int(7))
        });
        let result = Runner::new().run_case(&case).await;
        assert!(result.passed);
        assert!(result.duration_ms >= 20.0, "duration {}", result.duration_ms);
    }

    #[tokio::test]
    async fn test_deferred_run_failure_is_isolated() {
        let case = TestCase::deferred("reject", "rejects", Expected::Literal(Value::Int(1)), || async {
            Err(CheckError::failed("rejected"))
        });
        let result = Runner::new().run_case(&case).await;
        assert!(!result.passed);
        assert_eq!(result.actual, NOT_COMPUTED);
        assert_eq!(result.expected, "1");
        assert_eq!(result.error.as_deref(), Some("rejected"));
    }

    #[tokio::test]
    async fn test_deferred_expectation_resolves_after_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let run_counter = Arc::clone(&counter);
        let expected_counter = Arc::clone(&counter);
        let case = TestCase::immediate(
            "order",
            "expected sees the run's side effect",
            Expected::deferred(move || Value::Int(expected_counter.load(Ordering::SeqCst) as i64)),
            move || Ok(Value::Int(run_counter.fetch_add(1, Ordering::SeqCst) as i64 + 1)),
        );
        let result = Runner::new().run_case(&case).await;
        assert!(result.passed, "{result:?}");
        assert_eq!(result.expected, "1");
    }

    #[tokio::test]
    async fn test_custom_expressions() {
        let runner = Runner::new();
        let check = |label: &str, expression: &str, expected: &str| {
            custom_case(&CustomInputs::new(label, expression, expected)).unwrap()
        };

        let starter = runner.run_case(&custom_case(&CustomInputs::starter()).unwrap()).await;
        assert!(starter.passed, "{starter:?}");
        assert_eq!(starter.actual, "256");

        let sum = runner.run_case(&check("sum", "sum([1, 2])", "3")).await;
        assert!(sum.passed, "{sum:?}");

        let fib = runner.run_case(&check("fib", "fibonacci(10) == 55", "true")).await;
        assert!(fib.passed, "{fib:?}");

        let slug = runner.run_case(&check("slug", "slugify(' A B ')", "a-b")).await;
        assert!(slug.passed, "{slug:?}");

        let wrong = runner.run_case(&check("wrong", "1 + 1", "3")).await;
        assert!(!wrong.passed);
        assert!(wrong.error.is_none());
        assert_eq!(wrong.actual, "2");

        let broken = runner.run_case(&check("broken", "1 +", "2")).await;
        assert!(!broken.passed);
        assert_eq!(broken.actual, NOT_COMPUTED);
        assert!(broken.error.as_deref().unwrap_or("").starts_with("parse error"), "{broken:?}");

        let median = runner.run_case(&check("median", "median([])", "0")).await;
        assert_eq!(median.error.as_deref(), Some("Median requires at least one value"));

        let window = runner.run_case(&check("window", "add_days(today(), 14) == add_days(today(), 14)", "true")).await;
        assert!(window.passed, "{window:?}");
    }

    #[tokio::test]
    async fn test_oversized_custom_expression_fails_alone() {
        let expression = vec!["1"; 60_000].join("+");
        let inputs = CustomInputs::new("huge sum", expression, "60000");
        let results = Runner::new().run_all(&active_cases(&inputs)).await;

        assert_eq!(results.len(), 7);
        assert!(results[..6].iter().all(|r| r.passed), "{results:?}");
        let custom = &results[6];
        assert!(!custom.passed);
        assert_eq!(custom.actual, NOT_COMPUTED);
        assert!(custom.error.as_deref().unwrap_or("").contains("deeper than"), "{custom:?}");

        let modest = CustomInputs::new("modest sum", vec!["1"; 300].join(" + "), "300");
        let result = Runner::new().run_case(&custom_case(&modest).unwrap()).await;
        assert!(result.passed, "{result:?}");
    }

    // --- Report ---

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_single_pass() {
        let report = render(&[result("Median", true, 1.234, None)]);
        assert_eq!(report, "✓ Median\n  expected: 4\n  actual: 4\n  latency: 1.23ms");
        assert!(report.ends_with("latency: 1.23ms"));
    }

    #[test]
    fn test_render_failures_and_errors() {
        let report = render(&[
            result("Wrong", false, 0.5, None),
            result("Broken", false, 12.0, Some("Median requires at least one value")),
        ]);
        assert_eq!(
            report,
            "✗ Wrong\n  expected: 4\n  actual: 4\n  latency: 0.50ms\n\n\
             ✗ Broken\n  error: Median requires at least one value\n  expected: 4\n  actual: —\n  latency: 12.00ms"
        );
    }

    #[test]
    fn test_summary() {
        let results = [result("A", true, 1.0, None), result("B", false, 1.0, Some("x"))];
        let summary = summarize(&results);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.total, 2);
        assert!(!summary.all_passed());
        assert_eq!(summary.to_string(), "1 / 2 passing");
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(result("A", true, 1.5, None)).unwrap();
        assert_eq!(json["durationMs"], 1.5);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(result("B", false, 1.5, Some("bad"))).unwrap();
        assert_eq!(json["error"], "bad");
        assert_eq!(json["actual"], NOT_COMPUTED);
    }
}
