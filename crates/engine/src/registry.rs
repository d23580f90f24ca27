use chrono::Utc;
use serde::{Deserialize, Serialize};

use playground_expr::evaluate_with;
use playground_value::Value;

use crate::case::{Expected, TestCase};
use crate::checks;
use crate::error::CheckError;
use crate::host::CheckHost;

/// Id given to the case built from [`CustomInputs`].
pub const CUSTOM_CASE_ID: &str = "custom";

/// The three free-text fields a user edits to define one extra case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomInputs {
    pub label: String,
    pub expression: String,
    pub expected: String,
}

impl CustomInputs {
    pub fn new(label: impl Into<String>, expression: impl Into<String>, expected: impl Into<String>) -> Self {
        CustomInputs { label: label.into(), expression: expression.into(), expected: expected.into() }
    }

    /// The example a fresh session starts with.
    pub fn starter() -> Self {
        Self::new("2^8 equals 256", "Math.pow(2, 8)", "256")
    }

    /// A custom case exists only when both label and expression have content.
    pub fn is_complete(&self) -> bool {
        !self.label.trim().is_empty() && !self.expression.trim().is_empty()
    }
}

/// The built-in cases, always in this order.
pub fn default_cases() -> Vec<TestCase> {
    vec![
        TestCase::immediate(
            "sum",
            "Sum of [3, 5, 8, 13] equals 29",
            Expected::Literal(Value::Int(29)),
            || Ok(Value::Float(checks::sum(&[3.0, 5.0, 8.0, 13.0]))),
        ),
        TestCase::immediate(
            "fibonacci",
            "10th Fibonacci number equals 55",
            Expected::Literal(Value::Int(55)),
            || Ok(Value::Int(checks::fibonacci(10) as i64)),
        ),
        TestCase::immediate(
            "slugify",
            r#"Slugify "Agentic Test Playground" to "agentic-test-playground""#,
            Expected::Literal(Value::Text("agentic-test-playground".into())),
            || Ok(Value::Text(checks::slugify("Agentic Test Playground"))),
        ),
        TestCase::immediate(
            "date-window",
            "Next release window is 14 days from today",
            Expected::deferred(|| {
                checks::release_window(Utc::now())
                    .map(Value::Date)
                    .unwrap_or(Value::Null)
            }),
            || checks::release_window(Utc::now()).map(Value::Date),
        ),
        TestCase::immediate(
            "guard-phrase",
            r#"Phrase "red fox" is allowed (not block-listed)"#,
            Expected::Literal(Value::Bool(true)),
            || Ok(Value::Bool(!checks::is_blocked("red fox"))),
        ),
        TestCase::immediate(
            "median",
            "Median of [4, 1, 10, 8, 3] equals 4",
            Expected::Literal(Value::Int(4)),
            || checks::median(&[4.0, 1.0, 10.0, 8.0, 3.0]).map(Value::Float),
        ),
    ]
}

/// Build the user-defined case, or `None` when the inputs are incomplete.
///
/// The expected text is compared as plain text against the formatted actual value.
pub fn custom_case(inputs: &CustomInputs) -> Option<TestCase> {
    if !inputs.is_complete() {
        return None;
    }
    let expression = inputs.expression.clone();
    Some(TestCase::immediate(
        CUSTOM_CASE_ID,
        inputs.label.trim(),
        Expected::Literal(Value::Text(inputs.expected.trim().to_string())),
        move || evaluate_with(&expression, &CheckHost).map_err(CheckError::from),
    ))
}

/// Cases for one run: the defaults, then the custom case when present.
pub fn active_cases(inputs: &CustomInputs) -> Vec<TestCase> {
    let mut cases = default_cases();
    cases.extend(custom_case(inputs));
    cases
}
