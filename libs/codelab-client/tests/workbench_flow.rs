// End-to-end flow over on-disk state: edit, autosave, "reload", run, history

use codelab_client::common::types::Language;
use codelab_client::editor::{boilerplate, FileEditor};
use codelab_client::execution::RunOutcome;
use codelab_client::history::HistoryView;
use codelab_client::output::OutputState;
use codelab_client::prompt::{Confirmer, Notifier};
use codelab_client::store::FileStore;
use codelab_client::theme::{Document, StaticColorScheme, Theme, ThemeIcon, ThemePreference};
use codelab_client::transport::{ApiResponse, ScriptedTransport};
use codelab_client::workbench::{Workbench, WorkbenchParts};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Prompts {
    notices: Mutex<Vec<String>>,
}

impl Notifier for Prompts {
    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

impl Confirmer for Prompts {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

fn open_workbench(state_dir: &Path, transport: Arc<ScriptedTransport>, prompts: Arc<Prompts>) -> Workbench {
    let editor = FileEditor::open(state_dir.join("buffer")).unwrap();
    let mut parts = WorkbenchParts::new(
        Arc::new(FileStore::in_dir(state_dir)),
        transport,
        Box::new(editor),
        Arc::new(StaticColorScheme::new(Some("light".to_string()))),
        prompts.clone(),
        prompts,
    );
    parts.autosave_period = Duration::from_millis(500);
    Workbench::new(parts)
}

#[tokio::test(start_paused = true)]
async fn test_draft_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let prompts = Arc::new(Prompts::default());

    {
        let workbench = open_workbench(dir.path(), transport.clone(), prompts.clone());
        workbench.load().await;
        workbench.select_language(Language::C).await;
        assert_eq!(workbench.with_editor(|e| e.text()).await, boilerplate(&Language::C));

        let registration = workbench.start();
        workbench
            .with_editor(|e| e.set_text("int main() { puts(\"draft\"); }\n"))
            .await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        registration.dispose();
    }

    let reopened = open_workbench(dir.path(), transport, prompts);
    assert_eq!(reopened.current_language().await, Language::C);
    reopened.select_language(Language::Python).await;
    assert_eq!(reopened.with_editor(|e| e.text()).await, boilerplate(&Language::Python));
    reopened.select_language(Language::C).await;
    assert_eq!(
        reopened.with_editor(|e| e.text()).await,
        "int main() { puts(\"draft\"); }\n"
    );
}

#[tokio::test]
async fn test_run_then_history() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let prompts = Arc::new(Prompts::default());
    let workbench = open_workbench(dir.path(), transport.clone(), prompts.clone());
    workbench.load().await;

    transport
        .respond(ApiResponse::json(
            200,
            &json!({"success": true, "output": "Hello, World!\n", "execution_time": 0.012}),
        ))
        .respond(ApiResponse::new(200, "[]"))
        .fail("connection reset");

    assert_eq!(workbench.run("").await, RunOutcome::Succeeded);
    let output = workbench.output().await;
    assert_eq!(output.state(), OutputState::Success);
    assert!(output.content().contains("Hello, World!"));
    assert!(output.content().contains("0.012"));

    let history = workbench.list_submissions().await;
    assert_eq!(history, HistoryView::Empty);
    assert_eq!(history.to_string(), "No submissions yet.");

    assert!(workbench.view_submission(1).await.is_none());
    assert_eq!(
        *prompts.notices.lock().unwrap(),
        vec!["Failed to load submission details".to_string()]
    );
}

#[tokio::test]
async fn test_theme_preference_persists_raw_value() {
    let dir = tempfile::tempdir().unwrap();
    let workbench = open_workbench(
        dir.path(),
        Arc::new(ScriptedTransport::new()),
        Arc::new(Prompts::default()),
    );
    let mut document = Document::default();

    assert_eq!(workbench.restore_theme(&mut document).unwrap(), Theme::Light);
    workbench.set_theme(ThemePreference::Dark, &mut document).unwrap();

    let reopened = open_workbench(
        dir.path(),
        Arc::new(ScriptedTransport::new()),
        Arc::new(Prompts::default()),
    );
    let mut fresh = Document::default();
    assert_eq!(reopened.restore_theme(&mut fresh).unwrap(), Theme::Dark);
    assert_eq!(fresh.icon, Some(ThemeIcon::Moon));
}

#[tokio::test(start_paused = true)]
async fn test_watch_keeps_draft_when_other_process_switches_language() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let prompts = Arc::new(Prompts::default());

    let watcher = open_workbench(dir.path(), transport.clone(), prompts.clone());
    watcher.load().await;
    watcher.with_editor(|e| e.set_text("print('my python work')\n")).await;
    assert!(watcher.save_draft().await);
    let registration = watcher.start();

    let other = open_workbench(dir.path(), transport.clone(), prompts.clone());
    other.select_language(Language::Java).await;
    other.sync_editor().await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(watcher.current_language().await, Language::Java);
    registration.dispose();

    let reopened = open_workbench(dir.path(), transport, prompts);
    reopened.select_language(Language::Python).await;
    assert_eq!(
        reopened.with_editor(|e| e.text()).await,
        "print('my python work')\n"
    );
}
