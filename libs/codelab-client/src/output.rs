/// Output Region - Rendering State Machine
///
/// `Idle -> Loading -> {Success, Failed}`, and back to `Loading` on the
/// next run. Success and failure styling are one enum, so they can never
/// both be applied. The loading indicator is tracked separately so the
/// execution client can prove it is cleared on every exit path.

use codelab_common::types::{RunResult, TestCaseReport};
use std::fmt::Write as _;

pub const IDLE_PLACEHOLDER: &str = "Run your code to see the output here.";
pub const EXECUTING_PLACEHOLDER: &str = "Executing...";
pub const NO_OUTPUT: &str = "(No output)";
pub const EXECUTION_FAILED: &str = "Execution failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputRegion {
    state: OutputState,
    content: String,
    loading_visible: bool,
}

impl Default for OutputRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputRegion {
    pub fn new() -> Self {
        Self {
            state: OutputState::Idle,
            content: IDLE_PLACEHOLDER.to_string(),
            loading_visible: false,
        }
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn begin_loading(&mut self) {
        self.state = OutputState::Loading;
        self.content = EXECUTING_PLACEHOLDER.to_string();
        self.loading_visible = true;
    }

    pub fn finish_loading(&mut self) {
        self.loading_visible = false;
    }

    /// Render a result that came back over a successful transport
    pub fn show_result(&mut self, result: &RunResult) {
        let (state, content) = render_run_result(result);
        self.state = state;
        self.content = content;
    }

    /// Render a handled failure (service error, bad body, network)
    pub fn show_failure(&mut self, message: &str) {
        self.state = OutputState::Failed;
        self.content = format!("Error: {}", message);
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn is_problem_run(result: &RunResult) -> bool {
    result.total_test_cases.is_some() || !result.test_results.is_empty()
}

/// Final state and text for a run result
pub fn render_run_result(result: &RunResult) -> (OutputState, String) {
    let mut content = String::new();

    if let Some(seconds) = result.execution_time_seconds {
        let _ = writeln!(content, "Execution Time: {}s", seconds);
    }

    if is_problem_run(result) {
        return render_problem_run(result, content);
    }

    if result.success {
        content.push_str(non_empty(&result.output).unwrap_or(NO_OUTPUT));
        (OutputState::Success, content)
    } else {
        content.push_str(non_empty(&result.error).unwrap_or(EXECUTION_FAILED));
        if let Some(output) = non_empty(&result.output) {
            content.push_str("\n\nOutput:\n");
            content.push_str(output);
        }
        (OutputState::Failed, content)
    }
}

fn render_problem_run(result: &RunResult, mut content: String) -> (OutputState, String) {
    let total = result
        .total_test_cases
        .unwrap_or(result.test_results.len() as u32);
    let passed = result
        .test_cases_passed
        .unwrap_or_else(|| result.test_results.iter().filter(|t| t.passed).count() as u32);

    let _ = writeln!(content, "Passed {}/{} test cases", passed, total);
    if let Some(id) = result.submission_id {
        let _ = writeln!(content, "Submission #{} recorded", id);
    }
    if let Some(error) = non_empty(&result.error) {
        let _ = writeln!(content, "{}", error);
    }

    for (idx, case) in result.test_results.iter().enumerate() {
        content.push('\n');
        content.push_str(&render_test_case(idx + 1, case));
    }

    let state = if result.success && passed == total {
        OutputState::Success
    } else {
        OutputState::Failed
    };
    (state, content)
}

fn render_test_case(number: usize, case: &TestCaseReport) -> String {
    let verdict = if case.passed { "PASSED" } else { "FAILED" };
    let sample = if case.is_sample { " (sample)" } else { "" };
    format!(
        "Test {}{}: {}\nInput:\n{}\nExpected:\n{}\nActual:\n{}\n",
        number, sample, verdict, case.input, case.expected, case.actual
    )
}
