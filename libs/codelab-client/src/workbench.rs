/// Workbench - Session Controller
///
/// **Core Responsibility:**
/// Own the session (current language + editor) and the shared output
/// region, and route user intents to the components that act on them.
///
/// **Lifecycle:**
/// 1. `Workbench::new` binds the persisted current language
/// 2. `load` resolves the editor content for it (draft or boilerplate)
/// 3. `start` registers background work and returns a `Registration`;
///    dropping or disposing it tears everything down
///
/// The components never reach for globals: each receives what it needs
/// from here.

use crate::autosave::{spawn_autosave, AutosaveHandle, AUTOSAVE_PERIOD};
use crate::draft::DraftStore;
use crate::editor::Editor;
use crate::error::StoreError;
use crate::execution::{ExecutionClient, RunOutcome};
use crate::history::{HistoryClient, HistoryView};
use crate::output::OutputRegion;
use crate::prompt::{Confirmer, Notifier};
use crate::session::{self, Session};
use crate::store::KeyValueStore;
use crate::theme::{ColorSchemeProbe, Theme, ThemeController, ThemePreference, ThemeSurface};
use crate::transport::Transport;
use codelab_common::keys::CURRENT_LANGUAGE_KEY;
use codelab_common::types::{Language, RunMode, RunRequest, SubmissionDetail};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const EMPTY_CODE_NOTICE: &str = "Please enter some code to execute";

/// Collaborators a workbench is assembled from
pub struct WorkbenchParts {
    pub store: Arc<dyn KeyValueStore>,
    pub transport: Arc<dyn Transport>,
    pub editor: Box<dyn Editor>,
    pub probe: Arc<dyn ColorSchemeProbe>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
    pub autosave_period: Duration,
}

impl WorkbenchParts {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        editor: Box<dyn Editor>,
        probe: Arc<dyn ColorSchemeProbe>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            store,
            transport,
            editor,
            probe,
            notifier,
            confirmer,
            autosave_period: AUTOSAVE_PERIOD,
        }
    }
}

/// Background work registered by `Workbench::start`
pub struct Registration {
    autosave: Option<AutosaveHandle>,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.autosave.as_ref().is_some_and(AutosaveHandle::is_running)
    }

    pub fn dispose(mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.stop();
        }
    }
}

pub struct Workbench {
    session: Arc<Mutex<Session>>,
    store: Arc<dyn KeyValueStore>,
    drafts: DraftStore,
    execution: ExecutionClient,
    history: HistoryClient,
    theme: ThemeController,
    output: Arc<Mutex<OutputRegion>>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    autosave_period: Duration,
}

impl Workbench {
    pub fn new(parts: WorkbenchParts) -> Self {
        let language = session::persisted_language(parts.store.as_ref()).unwrap_or_default();
        debug!(language = %language, "Workbench created");

        Self {
            session: Arc::new(Mutex::new(Session::new(language, parts.editor))),
            drafts: DraftStore::new(parts.store.clone()),
            execution: ExecutionClient::new(parts.transport.clone()),
            history: HistoryClient::new(parts.transport),
            theme: ThemeController::new(parts.store.clone(), parts.probe),
            store: parts.store,
            output: Arc::new(Mutex::new(OutputRegion::new())),
            notifier: parts.notifier,
            confirmer: parts.confirmer,
            autosave_period: parts.autosave_period,
        }
    }

    /// Startup resolution: show the current language's draft or boilerplate
    pub async fn load(&self) {
        let language = self.current_language().await;
        let mut session = self.session.lock().await;
        session::select_language(&mut session, &self.drafts, language);
    }

    /// Register background work (autosave)
    pub fn start(&self) -> Registration {
        let handle = spawn_autosave(
            self.session.clone(),
            self.drafts.clone(),
            self.store.clone(),
            self.autosave_period,
        );
        Registration {
            autosave: Some(handle),
        }
    }

    pub async fn select_language(&self, language: Language) {
        {
            let mut session = self.session.lock().await;
            session::select_language(&mut session, &self.drafts, language.clone());
        }
        if let Err(e) = self.store.set(CURRENT_LANGUAGE_KEY, language.as_str()) {
            warn!(language = %language, error = %e, "Failed to persist current language");
        }
        info!(language = %language, "Language selected");
    }

    /// Confirmation-gated boilerplate restore
    pub async fn reset_code(&self) -> bool {
        let mut session = self.session.lock().await;
        session::reset_code(&mut session, self.confirmer.as_ref())
    }

    /// Run the editor content with `stdin` as program input
    pub async fn run(&self, stdin: &str) -> RunOutcome {
        match self.build_request(stdin).await {
            Some(request) => self.execution.run(request, &self.output).await,
            None => RunOutcome::Rejected,
        }
    }

    /// Run against a problem's test cases
    pub async fn run_problem(&self, stdin: &str, problem_id: u64, mode: RunMode) -> RunOutcome {
        match self.build_request(stdin).await {
            Some(request) => {
                let request = request.for_problem(problem_id, mode);
                self.execution.run(request, &self.output).await
            }
            None => RunOutcome::Rejected,
        }
    }

    async fn build_request(&self, stdin: &str) -> Option<RunRequest> {
        let (language, code) = {
            let mut session = self.session.lock().await;
            if let Err(e) = session.editor_mut().sync() {
                warn!(error = %e, "Failed to sync editor buffer");
            }
            (session.language().clone(), session.editor().text())
        };

        if code.trim().is_empty() {
            self.notifier.notify(EMPTY_CODE_NOTICE);
            return None;
        }
        Some(RunRequest::new(language, code, stdin))
    }

    pub async fn list_submissions(&self) -> HistoryView {
        self.history.list_submissions().await
    }

    pub async fn view_submission(&self, id: u64) -> Option<SubmissionDetail> {
        self.history.view_submission(id, self.notifier.as_ref()).await
    }

    pub fn set_theme(
        &self,
        preference: ThemePreference,
        surface: &mut dyn ThemeSurface,
    ) -> Result<Theme, StoreError> {
        self.theme.set_theme(preference, surface)
    }

    pub fn restore_theme(&self, surface: &mut dyn ThemeSurface) -> Result<Theme, StoreError> {
        self.theme.restore(surface)
    }

    pub fn saved_theme(&self) -> ThemePreference {
        self.theme.saved_preference()
    }

    pub async fn current_language(&self) -> Language {
        self.session.lock().await.language().clone()
    }

    /// Snapshot of the output region
    pub async fn output(&self) -> OutputRegion {
        self.output.lock().await.clone()
    }

    pub fn output_handle(&self) -> Arc<Mutex<OutputRegion>> {
        self.output.clone()
    }

    /// Mutable access to the editor widget
    pub async fn with_editor<R>(&self, f: impl FnOnce(&mut dyn Editor) -> R) -> R {
        let mut session = self.session.lock().await;
        f(session.editor_mut())
    }

    /// Flush pending editor changes to the backing storage
    pub async fn sync_editor(&self) -> std::io::Result<()> {
        self.session.lock().await.editor_mut().sync()
    }

    /// Save the current buffer as a draft right now
    pub async fn save_draft(&self) -> bool {
        crate::autosave::autosave_once(&self.session, &self.drafts, self.store.as_ref()).await
    }
}
