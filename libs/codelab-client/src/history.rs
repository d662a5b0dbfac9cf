/// History Client
///
/// Lists past submissions and fetches one submission's detail on demand.
/// Nothing is cached: every call goes back to the service. Failures are
/// logged for diagnostics and rendered, never returned to the caller.

use crate::error::ClientError;
use crate::prompt::Notifier;
use crate::transport::{ApiRequest, Transport};
use codelab_common::types::{parse_timestamp, SubmissionDetail, SubmissionStatus, SubmissionSummary};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, error};

pub const SUBMISSIONS_PATH: &str = "/api/submissions/";
pub const NO_SUBMISSIONS: &str = "No submissions yet.";
pub const LIST_FAILED: &str = "Failed to load submissions";
pub const DETAIL_FAILED: &str = "Failed to load submission details";

pub fn submission_path(id: u64) -> String {
    format!("{}{}/", SUBMISSIONS_PATH, id)
}

/// Visual treatment of a status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Positive,
    Negative,
    Pending,
    Neutral,
}

pub fn status_style(status: &SubmissionStatus) -> StatusStyle {
    match status {
        SubmissionStatus::Success | SubmissionStatus::Accepted => StatusStyle::Positive,
        SubmissionStatus::Error | SubmissionStatus::Failed | SubmissionStatus::Timeout => {
            StatusStyle::Negative
        }
        SubmissionStatus::Pending | SubmissionStatus::Queued | SubmissionStatus::Running => {
            StatusStyle::Pending
        }
        SubmissionStatus::Partial | SubmissionStatus::Other(_) => StatusStyle::Neutral,
    }
}

/// What the submissions list shows
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    Entries(Vec<SubmissionSummary>),
    Empty,
    Unavailable,
}

impl fmt::Display for HistoryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryView::Entries(entries) => {
                let rendered: Vec<String> = entries.iter().map(render_summary).collect();
                f.write_str(&rendered.join("\n"))
            }
            HistoryView::Empty => f.write_str(NO_SUBMISSIONS),
            HistoryView::Unavailable => f.write_str(LIST_FAILED),
        }
    }
}

/// Local-time rendering of a service timestamp; unparseable values are shown raw
pub fn display_time(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|local| local.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One self-contained list item
pub fn render_summary(summary: &SubmissionSummary) -> String {
    let mut item = String::new();
    let _ = writeln!(
        item,
        "#{} [{}] {}",
        summary.id,
        summary.language.as_str().to_uppercase(),
        summary.status
    );

    let _ = writeln!(item, "Time: {}", display_time(&summary.submitted_at));

    if let Some(seconds) = summary.execution_time_seconds {
        let _ = writeln!(item, "Execution: {:.3}s", seconds);
    }
    let _ = writeln!(item, "{}", summary.code_preview);
    item
}

pub fn render_detail(detail: &SubmissionDetail) -> String {
    let mut text = String::from("Submission Details:\n\n");
    if let Some(id) = detail.id {
        let _ = writeln!(text, "Id: {}", id);
    }
    if let Some(user) = &detail.user {
        let _ = writeln!(text, "User: {}", user);
    }
    let _ = writeln!(text, "Language: {}", detail.language);
    let _ = writeln!(text, "Status: {}", detail.status);
    if let Some(submitted_at) = &detail.submitted_at {
        let _ = writeln!(text, "Submitted: {}", display_time(submitted_at));
    }
    if let Some(seconds) = detail.execution_time_seconds {
        let _ = writeln!(text, "Execution: {:.3}s", seconds);
    }
    let _ = write!(text, "\nCode:\n{}\n", detail.code);
    if let Some(input) = detail.input_data.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(text, "\nInput:\n{}\n", input);
    }
    let output = detail.output.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
    let error = detail
        .error_message
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("None");
    let _ = write!(text, "\nOutput:\n{}\n\nError:\n{}", output, error);
    text
}

#[derive(Clone)]
pub struct HistoryClient {
    transport: Arc<dyn Transport>,
}

impl HistoryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, failure: &str) -> Result<T, ClientError> {
        let response = self.transport.send(ApiRequest::get(path)).await?;
        if !response.is_success() {
            debug!(path, status = response.status, "History request rejected");
            return Err(ClientError::Service(format!("{} (HTTP {})", failure, response.status)));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn fetch_submissions(&self) -> Result<Vec<SubmissionSummary>, ClientError> {
        self.fetch(SUBMISSIONS_PATH, LIST_FAILED).await
    }

    pub async fn fetch_submission(&self, id: u64) -> Result<SubmissionDetail, ClientError> {
        self.fetch(&submission_path(id), DETAIL_FAILED).await
    }

    /// Submissions in service order; failures render as `Unavailable`
    pub async fn list_submissions(&self) -> HistoryView {
        match self.fetch_submissions().await {
            Ok(entries) if entries.is_empty() => HistoryView::Empty,
            Ok(entries) => HistoryView::Entries(entries),
            Err(e) => {
                error!(error = %e, "Error loading submissions");
                HistoryView::Unavailable
            }
        }
    }

    /// One submission's detail; on failure the user is notified and `None` returned
    pub async fn view_submission(&self, id: u64, notifier: &dyn Notifier) -> Option<SubmissionDetail> {
        match self.fetch_submission(id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                error!(submission_id = id, error = %e, "Error loading submission");
                notifier.notify(DETAIL_FAILED);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ApiResponse, Method, ScriptedTransport};
    use codelab_common::types::Language;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn history(transport: &Arc<ScriptedTransport>) -> HistoryClient {
        HistoryClient::new(transport.clone())
    }

    fn summary_json() -> serde_json::Value {
        json!([
            {"id": 2, "language": "python", "status": "success",
             "submitted_at": "2024-05-02T09:30:00+00:00", "execution_time": 0.0123,
             "code_preview": "print('hi')"},
            {"id": 1, "language": "java", "status": "error",
             "submitted_at": "2024-05-01T08:00:00+00:00", "execution_time": null,
             "code_preview": "public class Main {..."}
        ])
    }

    #[tokio::test]
    async fn test_list_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::new(200, "[]"));

        let view = history(&transport).list_submissions().await;
        assert_eq!(view, HistoryView::Empty);
        assert_eq!(view.to_string(), "No submissions yet.");
    }

    #[tokio::test]
    async fn test_list_preserves_service_order() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(200, &summary_json()));

        let view = history(&transport).list_submissions().await;
        let HistoryView::Entries(entries) = &view else {
            panic!("expected entries, got {:?}", view);
        };
        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let rendered = view.to_string();
        assert!(rendered.contains("[PYTHON] success"));
        assert!(rendered.contains("Execution: 0.012s"));
        assert!(rendered.contains("[JAVA] error"));

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].path, SUBMISSIONS_PATH);
        assert!(sent[0].with_credentials);
    }

    #[tokio::test]
    async fn test_list_failures_render_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(ApiResponse::new(403, r#"{"detail": "no"}"#))
            .respond(ApiResponse::new(200, "{ broken"))
            .fail("offline");

        let client = history(&transport);
        for _ in 0..3 {
            let view = client.list_submissions().await;
            assert_eq!(view, HistoryView::Unavailable);
            assert_eq!(view.to_string(), "Failed to load submissions");
        }
    }

    #[test]
    fn test_summary_without_execution_time() {
        let summary = SubmissionSummary {
            id: 5,
            language: Language::C,
            status: SubmissionStatus::Queued,
            submitted_at: "not a timestamp".to_string(),
            execution_time_seconds: None,
            code_preview: "#include".to_string(),
        };
        let item = render_summary(&summary);
        assert!(item.contains("[C] queued"));
        assert!(item.contains("Time: not a timestamp"));
        assert!(!item.contains("Execution:"));
    }

    #[test]
    fn test_status_styles() {
        assert_eq!(status_style(&SubmissionStatus::Success), StatusStyle::Positive);
        assert_eq!(status_style(&SubmissionStatus::Accepted), StatusStyle::Positive);
        assert_eq!(status_style(&SubmissionStatus::Timeout), StatusStyle::Negative);
        assert_eq!(status_style(&SubmissionStatus::Running), StatusStyle::Pending);
        assert_eq!(
            status_style(&SubmissionStatus::Other("weird".to_string())),
            StatusStyle::Neutral
        );
    }

    #[tokio::test]
    async fn test_view_submission_refetches_every_time() {
        let transport = Arc::new(ScriptedTransport::new());
        let detail = json!({"language": "c", "status": "success", "code": "int main(){}", "output": "ok"});
        transport
            .respond(ApiResponse::json(200, &detail))
            .respond(ApiResponse::json(200, &detail));
        let notifier = RecordingNotifier::default();

        let client = history(&transport);
        let first = client.view_submission(7, &notifier).await.unwrap();
        let second = client.view_submission(7, &notifier).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.code, "int main(){}");

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/api/submissions/7/", "/api/submissions/7/"]);
        assert!(notifier.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_view_submission_failure_notifies() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(404, &json!({"error": "Submission not found"})));
        let notifier = RecordingNotifier::default();

        let detail = history(&transport).view_submission(99, &notifier).await;
        assert!(detail.is_none());
        assert_eq!(
            *notifier.messages.lock().unwrap(),
            vec!["Failed to load submission details".to_string()]
        );
    }

    #[test]
    fn test_render_detail_defaults() {
        let detail = SubmissionDetail {
            id: None,
            user: None,
            language: Language::Python,
            status: SubmissionStatus::Error,
            code: "print(".to_string(),
            input_data: None,
            output: None,
            error_message: Some("SyntaxError".to_string()),
            execution_time_seconds: None,
            submitted_at: None,
        };
        let text = render_detail(&detail);
        assert!(text.contains("Language: python"));
        assert!(text.contains("Status: error"));
        assert!(text.contains("Code:\nprint("));
        assert!(text.contains("Output:\nN/A"));
        assert!(text.contains("Error:\nSyntaxError"));
    }

    #[test]
    fn test_detail_and_summary_share_time_format() {
        let raw = "2024-05-02T09:30:00+00:00";
        let local = display_time(raw);
        assert_ne!(local, raw);

        let detail: SubmissionDetail = serde_json::from_value(json!({
            "language": "python", "status": "success", "code": "print(1)",
            "submitted_at": raw
        }))
        .unwrap();
        assert!(render_detail(&detail).contains(&format!("Submitted: {}", local)));

        let summary = SubmissionSummary {
            id: 1,
            language: Language::Python,
            status: SubmissionStatus::Success,
            submitted_at: raw.to_string(),
            execution_time_seconds: None,
            code_preview: "print(1)".to_string(),
        };
        assert!(render_summary(&summary).contains(&format!("Time: {}", local)));
        assert_eq!(display_time("not a timestamp"), "not a timestamp");
    }
}
