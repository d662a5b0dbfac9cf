/// Execution Client
///
/// **Core Responsibility:**
/// Send one run request to the execution service and render the outcome
/// into the shared output region.
///
/// **Guarantees:**
/// - The loading indicator is raised before the call and cleared on every
///   exit path (result, service error, bad body, network failure)
/// - Nothing escapes `run`: every failure becomes error-styled output
/// - Single shot: a failed run is never retried
///
/// Overlapping runs are not serialized; whichever finishes last owns the
/// output region.

use crate::error::ClientError;
use crate::output::{OutputRegion, OutputState, EXECUTION_FAILED};
use crate::transport::{ApiRequest, Transport};
use codelab_common::types::{RunRequest, RunResult, ServiceError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const EXECUTE_PATH: &str = "/api/execute/";

/// How a `run` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Blocked before any network call (e.g. blank code)
    Rejected,
    Succeeded,
    Failed,
}

#[derive(Clone)]
pub struct ExecutionClient {
    transport: Arc<dyn Transport>,
}

/// Message to show for a non-2xx response body
fn service_error_message(body: &str) -> String {
    serde_json::from_str::<ServiceError>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| EXECUTION_FAILED.to_string())
}

impl ExecutionClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue the request and decode the result, without touching any UI state
    pub async fn execute(&self, request: &RunRequest) -> Result<RunResult, ClientError> {
        let body = serde_json::to_value(request)?;
        let response = self
            .transport
            .send(ApiRequest::post_json(EXECUTE_PATH, body))
            .await?;

        if !response.is_success() {
            return Err(ClientError::Service(service_error_message(&response.body)));
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    /// Execute and render into `output`
    pub async fn run(&self, request: RunRequest, output: &Mutex<OutputRegion>) -> RunOutcome {
        output.lock().await.begin_loading();

        let language = request.language.clone();
        let result = self.execute(&request).await;

        let mut region = output.lock().await;
        region.finish_loading();

        match result {
            Ok(result) => {
                region.show_result(&result);
                info!(
                    language = %language,
                    success = result.success,
                    execution_time = ?result.execution_time_seconds,
                    "Execution finished"
                );
                if region.state() == OutputState::Success {
                    RunOutcome::Succeeded
                } else {
                    RunOutcome::Failed
                }
            }
            Err(e) => {
                warn!(language = %language, error = %e, "Execution request failed");
                region.show_failure(&e.to_string());
                RunOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::{ApiResponse, Method, ScriptedTransport};
    use async_trait::async_trait;
    use codelab_common::types::{Language, RunMode};
    use serde_json::json;
    use tokio::sync::{oneshot, Notify};

    fn client(transport: &Arc<ScriptedTransport>) -> ExecutionClient {
        ExecutionClient::new(transport.clone())
    }

    fn hello_request() -> RunRequest {
        RunRequest::new(Language::Python, "print('Hello, World!')", "")
    }

    #[test]
    fn test_service_error_message() {
        assert_eq!(service_error_message(r#"{"error": "Code too long"}"#), "Code too long");
        assert_eq!(service_error_message("<html>502</html>"), EXECUTION_FAILED);
        assert_eq!(service_error_message(r#"{"detail": "x"}"#), EXECUTION_FAILED);
        assert_eq!(service_error_message(r#"{"error": ""}"#), EXECUTION_FAILED);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(200, &json!({"success": true})));

        let request = RunRequest::new(Language::Cpp, "int main(){}", "1 2\n").for_problem(9, RunMode::Run);
        client(&transport).execute(&request).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].path, EXECUTE_PATH);
        assert!(sent[0].csrf_protected);
        assert!(sent[0].with_credentials);
        assert_eq!(
            sent[0].body,
            Some(json!({
                "language": "cpp",
                "code": "int main(){}",
                "input": "1 2\n",
                "problem_id": 9,
                "mode": "run"
            }))
        );
    }

    #[tokio::test]
    async fn test_run_success() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(
            200,
            &json!({"success": true, "output": "Hello, World!\n", "execution_time": 0.012}),
        ));
        let output = Mutex::new(OutputRegion::new());

        let outcome = client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(outcome, RunOutcome::Succeeded);
        assert_eq!(region.state(), OutputState::Success);
        assert!(region.content().contains("Hello, World!"));
        assert!(region.content().contains("0.012"));
        assert!(!region.is_loading_visible());
    }

    #[tokio::test]
    async fn test_run_unparsable_error_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::new(500, "Internal Server Error"));
        let output = Mutex::new(OutputRegion::new());

        let outcome = client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(region.state(), OutputState::Failed);
        assert!(region.content().contains("Execution failed"));
        assert!(!region.is_loading_visible());
    }

    #[tokio::test]
    async fn test_run_structured_error_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(400, &json!({"error": "Language and code are required"})));
        let output = Mutex::new(OutputRegion::new());

        client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(region.content(), "Error: Language and code are required");
    }

    #[tokio::test]
    async fn test_run_program_failure_keeps_partial_output() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::json(
            200,
            &json!({"success": false, "error": "SyntaxError", "output": "partial"}),
        ));
        let output = Mutex::new(OutputRegion::new());

        let outcome = client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(region.state(), OutputState::Failed);
        assert!(region.content().contains("SyntaxError"));
        assert!(region.content().contains("partial"));
    }

    #[tokio::test]
    async fn test_run_network_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("connection refused");
        let output = Mutex::new(OutputRegion::new());

        let outcome = client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(region.state(), OutputState::Failed);
        assert_eq!(region.content(), "Error: connection refused");
        assert!(!region.is_loading_visible());
    }

    #[tokio::test]
    async fn test_run_malformed_success_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::new(200, "not json"));
        let output = Mutex::new(OutputRegion::new());

        let outcome = client(&transport).run(hello_request(), &output).await;

        let region = output.lock().await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert!(region.content().starts_with("Error: Invalid response from service"));
        assert!(!region.is_loading_visible());
    }

    #[tokio::test]
    async fn test_failed_run_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(ApiResponse::new(503, ""));
        let output = Mutex::new(OutputRegion::new());

        client(&transport).run(hello_request(), &output).await;
        assert_eq!(transport.requests().len(), 1);
    }

    /// Holds the response until the test releases it
    struct GatedTransport {
        entered: Notify,
        release: Mutex<Option<oneshot::Receiver<Result<ApiResponse, String>>>>,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let gate = self.release.lock().await.take();
            self.entered.notify_one();
            match gate {
                Some(rx) => match rx.await {
                    Ok(Ok(response)) => Ok(response),
                    Ok(Err(message)) => Err(TransportError::Network(message)),
                    Err(_) => Err(TransportError::Network("gate dropped".to_string())),
                },
                None => Err(TransportError::Network("no gate".to_string())),
            }
        }
    }

    async fn assert_loading_cleared_after(reply: Result<ApiResponse, String>) {
        let (tx, rx) = oneshot::channel();
        let transport = Arc::new(GatedTransport {
            entered: Notify::new(),
            release: Mutex::new(Some(rx)),
        });
        let client = ExecutionClient::new(transport.clone());
        let output = Arc::new(Mutex::new(OutputRegion::new()));

        let task = {
            let output = output.clone();
            tokio::spawn(async move { client.run(hello_request(), &output).await })
        };

        transport.entered.notified().await;
        {
            let region = output.lock().await;
            assert!(region.is_loading_visible());
            assert_eq!(region.state(), OutputState::Loading);
        }

        tx.send(reply).unwrap();
        task.await.unwrap();

        let region = output.lock().await;
        assert!(!region.is_loading_visible());
        assert_ne!(region.state(), OutputState::Loading);
    }

    #[tokio::test]
    async fn test_loading_indicator_lifecycle() {
        assert_loading_cleared_after(Ok(ApiResponse::json(200, &json!({"success": true, "output": "ok"})))).await;
        assert_loading_cleared_after(Ok(ApiResponse::json(500, &json!({"error": "boom"})))).await;
        assert_loading_cleared_after(Err("network down".to_string())).await;
    }
}
