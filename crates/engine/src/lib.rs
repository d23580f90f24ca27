pub mod case;
pub mod checks;
pub mod error;
pub mod host;
pub mod registry;
pub mod report;
pub mod runner;
pub mod session;
#[cfg(test)]
mod tests;

pub use case::{CaseRun, Expected, TestCase, TestResult, NOT_COMPUTED};
pub use error::{CheckError, SessionError};
pub use registry::{active_cases, custom_case, default_cases, CustomInputs};
pub use report::{render, summarize, Summary};
pub use runner::Runner;
pub use session::{CasePreview, CopyOutcome, ReportSink, Session};
