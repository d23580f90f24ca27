use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use playground_value::format_value;

use crate::case::{TestCase, TestResult};
use crate::error::SessionError;
use crate::registry::{active_cases, CustomInputs};
use crate::report::{render, summarize, Summary};
use crate::runner::Runner;

/// Destination for an exported report (clipboard, file, terminal).
pub trait ReportSink {
    fn write_report(&mut self, report: &str) -> io::Result<()>;
}

/// What happened to a copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// No completed run, nothing was written.
    Empty,
    Failed(String),
}

/// A case as shown before any run: its expected value, rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasePreview {
    pub id: String,
    pub label: String,
    pub expected: String,
}

/// State owned by one interactive session: the custom inputs being edited
/// and the result set of the last completed run.
///
/// Only one run may be in flight; results are published whole when it ends.
pub struct Session {
    runner: Runner,
    inputs: RwLock<CustomInputs>,
    results: RwLock<Option<Arc<[TestResult]>>>,
    in_flight: AtomicBool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CustomInputs::starter())
    }
}

/// Clears the in-flight flag when a run ends, including by panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(inputs: CustomInputs) -> Self {
        Session {
            runner: Runner::new(),
            inputs: RwLock::new(inputs),
            results: RwLock::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn inputs(&self) -> CustomInputs {
        self.inputs.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_inputs(&self, inputs: CustomInputs) {
        debug!(label = %inputs.label, complete = inputs.is_complete(), "custom inputs updated");
        *self.inputs.write().unwrap_or_else(PoisonError::into_inner) = inputs;
    }

    /// Cases a run started now would execute.
    pub fn active_cases(&self) -> Vec<TestCase> {
        active_cases(&self.inputs())
    }

    pub fn pending_preview(&self) -> Vec<CasePreview> {
        self.active_cases()
            .iter()
            .map(|case| CasePreview {
                id: case.id().to_string(),
                label: case.label().to_string(),
                expected: format_value(&case.expected().resolve()),
            })
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Execute the active cases and publish the results.
    pub async fn run(&self) -> Result<Arc<[TestResult]>, SessionError> {
        self.run_with(self.active_cases()).await
    }

    /// Execute an explicit case set under the same single-flight rule.
    pub async fn run_with(&self, cases: Vec<TestCase>) -> Result<Arc<[TestResult]>, SessionError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("run rejected: another run is in progress");
            return Err(SessionError::RunInFlight);
        }
        let _guard = InFlight(&self.in_flight);

        info!(cases = cases.len(), "run started");
        let results: Arc<[TestResult]> = self.runner.run_all(&cases).await.into();

        for result in results.iter().filter(|r| !r.passed) {
            debug!(id = %result.id, error = ?result.error, "case failed");
        }
        let summary = summarize(&results);
        *self.results.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&results));
        info!(passed = summary.passed, total = summary.total, "run finished");
        Ok(results)
    }

    /// Results of the last completed run, `None` before the first run.
    pub fn results(&self) -> Option<Arc<[TestResult]>> {
        self.results.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Report text of the last run, `""` before the first run.
    pub fn report(&self) -> String {
        self.results().map(|r| render(&r)).unwrap_or_default()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.results().map(|r| summarize(&r))
    }

    /// Hand the report to `sink`. A failing sink never touches the results.
    pub fn copy_report(&self, sink: &mut dyn ReportSink) -> CopyOutcome {
        let report = self.report();
        if report.is_empty() {
            return CopyOutcome::Empty;
        }
        match sink.write_report(&report) {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                warn!(error = %e, "report copy failed");
                CopyOutcome::Failed(e.to_string())
            }
        }
    }
}
