use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use futures::FutureExt;

use playground_value::{format_value, is_same_value, Value};

use crate::case::{CaseRun, TestCase, TestResult, NOT_COMPUTED};
use crate::error::CheckError;

/// Message used when a failure carries no text of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Executes cases one after another, isolating each case's failure.
///
/// The runner itself performs no I/O and keeps no state between runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Runner
    }

    /// Run every case in order. Case k+1 starts only after case k is recorded.
    pub async fn run_all(&self, cases: &[TestCase]) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.run_case(case).await);
        }
        results
    }

    /// Run one case. Never fails: errors and panics become a failed result.
    pub async fn run_case(&self, case: &TestCase) -> TestResult {
        let started = Instant::now();
        let outcome = invoke(case.run()).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        // Deferred expectations are resolved only now, after the action finished.
        let expected = catch_unwind(AssertUnwindSafe(|| case.expected().resolve()))
            .map_err(|payload| CheckError::Panicked(panic_message(payload.as_ref())));

        match (outcome, expected) {
            (Ok(actual), Ok(expected)) => TestResult {
                id: case.id().to_string(),
                label: case.label().to_string(),
                expected: format_value(&expected),
                actual: format_value(&actual),
                passed: is_same_value(&actual, &expected),
                duration_ms,
                error: None,
            },
            (Err(err), Ok(expected)) => failed(case, format_value(&expected), &err, duration_ms),
            (_, Err(err)) => failed(case, NOT_COMPUTED.to_string(), &err, duration_ms),
        }
    }
}

fn failed(case: &TestCase, expected: String, err: &CheckError, duration_ms: f64) -> TestResult {
    TestResult {
        id: case.id().to_string(),
        label: case.label().to_string(),
        expected,
        actual: NOT_COMPUTED.to_string(),
        passed: false,
        duration_ms,
        error: Some(failure_message(err)),
    }
}

fn failure_message(err: &CheckError) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        msg
    }
}

async fn invoke(run: &CaseRun) -> Result<Value, CheckError> {
    match run {
        CaseRun::Immediate(action) => catch_unwind(AssertUnwindSafe(|| action()))
            .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(payload.as_ref())))),
        CaseRun::Deferred(action) => {
            let future = match catch_unwind(AssertUnwindSafe(|| action())) {
                Ok(future) => future,
                Err(payload) => return Err(CheckError::Panicked(panic_message(payload.as_ref()))),
            };
            AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(payload.as_ref()))))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    }
}
