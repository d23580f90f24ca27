use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use playground_value::Value;

use crate::error::CheckError;

/// Sentinel shown in place of an actual value that was never computed.
pub const NOT_COMPUTED: &str = "—";

pub type CheckFuture = BoxFuture<'static, Result<Value, CheckError>>;

type ImmediateFn = dyn Fn() -> Result<Value, CheckError> + Send + Sync;
type DeferredFn = dyn Fn() -> CheckFuture + Send + Sync;
type ExpectedFn = dyn Fn() -> Value + Send + Sync;

/// Expected outcome of a case: fixed up front, or computed at comparison time.
#[derive(Clone)]
pub enum Expected {
    Literal(Value),
    Deferred(Arc<ExpectedFn>),
}

impl Expected {
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Expected::Deferred(Arc::new(producer))
    }

    /// Produce the expected value. Deferred producers run on every call.
    pub fn resolve(&self) -> Value {
        match self {
            Expected::Literal(v) => v.clone(),
            Expected::Deferred(producer) => producer(),
        }
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Expected::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// How a case produces its actual value.
#[derive(Clone)]
pub enum CaseRun {
    Immediate(Arc<ImmediateFn>),
    Deferred(Arc<DeferredFn>),
}

impl fmt::Debug for CaseRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseRun::Immediate(_) => f.write_str("Immediate(..)"),
            CaseRun::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A named check: an action to execute plus the outcome it should produce.
/// Immutable once constructed; clones share the underlying closures.
#[derive(Debug, Clone)]
pub struct TestCase {
    id: String,
    label: String,
    expected: Expected,
    run: CaseRun,
}

impl TestCase {
    pub fn new(id: impl Into<String>, label: impl Into<String>, expected: Expected, run: CaseRun) -> Self {
        TestCase { id: id.into(), label: label.into(), expected, run }
    }

    /// Case whose action completes synchronously.
    pub fn immediate<F>(id: impl Into<String>, label: impl Into<String>, expected: Expected, run: F) -> Self
    where
        F: Fn() -> Result<Value, CheckError> + Send + Sync + 'static,
    {
        Self::new(id, label, expected, CaseRun::Immediate(Arc::new(run)))
    }

    /// Case whose action is awaited.
    pub fn deferred<F, Fut>(id: impl Into<String>, label: impl Into<String>, expected: Expected, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CheckError>> + Send + 'static,
    {
        let run: Arc<DeferredFn> = Arc::new(move || run().boxed());
        Self::new(id, label, expected, CaseRun::Deferred(run))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    pub fn run(&self) -> &CaseRun {
        &self.run
    }
}

/// Outcome of executing one case, with expected/actual already rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub label: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
