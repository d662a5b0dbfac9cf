use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Programming language understood by the practice service.
///
/// The four catalog languages have editor modes and boilerplate; anything
/// else is carried verbatim as `Other` and edited as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    Python,
    C,
    Cpp,
    Java,
    Other(String),
}

impl Language {
    /// Languages offered in the language picker, in display order
    pub const CATALOG: [Language; 4] = [Language::Python, Language::C, Language::Cpp, Language::Java];

    pub fn as_str(&self) -> &str {
        match self {
            Language::Python => "python",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Language::Python => "Python",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::Other(name) => name,
        }
    }

    pub fn is_catalog(&self) -> bool {
        !matches!(self, Language::Other(_))
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Python
    }
}

impl From<String> for Language {
    fn from(raw: String) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "python" => Language::Python,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "java" => Language::Java,
            _ => Language::Other(normalized),
        }
    }
}

impl From<&str> for Language {
    fn from(raw: &str) -> Self {
        Language::from(raw.to_string())
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        match language {
            Language::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::from(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Problem-mode execution flavour: `Run` checks sample cases only,
/// `Submit` checks every case and records a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Run,
    Submit,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" => Ok(RunMode::Run),
            "submit" => Ok(RunMode::Submit),
            other => Err(format!("unknown run mode '{}' (expected run or submit)", other)),
        }
    }
}

/// Body of `POST /api/execute/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub language: Language,
    pub code: String,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RunMode>,
}

impl RunRequest {
    pub fn new(language: Language, code: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            language,
            code: code.into(),
            input: input.into(),
            problem_id: None,
            mode: None,
        }
    }

    pub fn for_problem(mut self, problem_id: u64, mode: RunMode) -> Self {
        self.problem_id = Some(problem_id);
        self.mode = Some(mode);
        self
    }
}

/// Successful-transport response of the execution service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "execution_time")]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub submission_id: Option<u64>,
    #[serde(default)]
    pub test_cases_passed: Option<u32>,
    #[serde(default)]
    pub total_test_cases: Option<u32>,
    #[serde(default)]
    pub test_results: Vec<TestCaseReport>,
}

/// Per-case outcome reported in problem mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCaseReport {
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub actual: String,
    #[serde(default)]
    pub is_sample: bool,
}

/// Structured error body returned with non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub error: Option<String>,
}

/// Submission lifecycle status as reported by the history service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubmissionStatus {
    Pending,
    Queued,
    Running,
    Success,
    Error,
    Timeout,
    Accepted,
    Partial,
    Failed,
    Other(String),
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Queued => "queued",
            SubmissionStatus::Running => "running",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error => "error",
            SubmissionStatus::Timeout => "timeout",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Partial => "partial",
            SubmissionStatus::Failed => "failed",
            SubmissionStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for SubmissionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => SubmissionStatus::Pending,
            "queued" => SubmissionStatus::Queued,
            "running" => SubmissionStatus::Running,
            "success" => SubmissionStatus::Success,
            "error" => SubmissionStatus::Error,
            "timeout" => SubmissionStatus::Timeout,
            "accepted" => SubmissionStatus::Accepted,
            "partial" => SubmissionStatus::Partial,
            "failed" => SubmissionStatus::Failed,
            _ => SubmissionStatus::Other(raw),
        }
    }
}

impl From<SubmissionStatus> for String {
    fn from(status: SubmissionStatus) -> Self {
        match status {
            SubmissionStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `GET /api/submissions/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub id: u64,
    pub language: Language,
    pub status: SubmissionStatus,
    pub submitted_at: String,
    #[serde(default, rename = "execution_time")]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub code_preview: String,
}

impl SubmissionSummary {
    /// Submission time in the local timezone, if the service sent a parseable timestamp
    pub fn submitted_at_local(&self) -> Option<DateTime<Local>> {
        parse_timestamp(&self.submitted_at)
    }
}

/// Body of `GET /api/submissions/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub user: Option<String>,
    pub language: Language,
    pub status: SubmissionStatus,
    pub code: String,
    #[serde(default)]
    pub input_data: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, rename = "execution_time")]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// Parse an ISO-8601 timestamp, with or without an offset.
///
/// Naive timestamps are interpreted as UTC, which is what the service
/// stores when timezone support is disabled.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Local));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| chrono::Utc.from_utc_datetime(&naive).with_timezone(&Local))
}
