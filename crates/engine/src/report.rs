use std::fmt;

use serde::Serialize;

use crate::case::TestResult;

pub const PASS_GLYPH: &str = "✓";
pub const FAIL_GLYPH: &str = "✗";

/// Render results as the copy-paste report: one block per result,
/// blocks separated by a blank line. Empty input renders as `""`.
pub fn render(results: &[TestResult]) -> String {
    results
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(result: &TestResult) -> String {
    let glyph = if result.passed && result.error.is_none() {
        PASS_GLYPH
    } else {
        FAIL_GLYPH
    };
    let mut block = format!("{glyph} {}", result.label);
    if let Some(error) = &result.error {
        block.push_str(&format!("\n  error: {error}"));
    }
    block.push_str(&format!("\n  expected: {}", result.expected));
    block.push_str(&format!("\n  actual: {}", result.actual));
    block.push_str(&format!("\n  latency: {:.2}ms", result.duration_ms));
    block
}

/// Pass count over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub total: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} passing", self.passed, self.total)
    }
}

pub fn summarize(results: &[TestResult]) -> Summary {
    Summary {
        passed: results.iter().filter(|r| r.passed).count(),
        total: results.len(),
    }
}
