/// Draft Autosave
///
/// Polls the editor on a fixed period and stores its content as the
/// active language's draft. Polling instead of per-keystroke writes caps
/// write volume; at most one period of edits is lost on a crash.
///
/// The task runs until its `AutosaveHandle` is stopped or dropped.
///
/// A file-backed buffer may be shared with other processes. When the
/// persisted current language no longer matches the session's, another
/// process switched languages and the buffer holds that language's code:
/// the tick rebinds the session and writes nothing.

use crate::draft::DraftStore;
use crate::session::{adopt_language, persisted_language, Session};
use crate::store::KeyValueStore;
use codelab_common::config::DEFAULT_AUTOSAVE_SECS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(DEFAULT_AUTOSAVE_SECS);

/// One autosave tick. Returns whether a draft was written.
pub async fn autosave_once(
    session: &Mutex<Session>,
    drafts: &DraftStore,
    store: &dyn KeyValueStore,
) -> bool {
    let (language, code) = {
        let mut session = session.lock().await;
        if let Some(persisted) = persisted_language(store) {
            if &persisted != session.language() {
                info!(
                    from = %session.language(),
                    to = %persisted,
                    "Current language changed elsewhere; skipping autosave"
                );
                adopt_language(&mut session, persisted);
                if let Err(e) = session.editor_mut().sync() {
                    warn!(error = %e, "Failed to sync editor buffer");
                }
                return false;
            }
        }
        if let Err(e) = session.editor_mut().sync() {
            warn!(error = %e, "Failed to sync editor buffer");
        }
        (session.language().clone(), session.editor().text())
    };

    match drafts.save(&language, &code) {
        Ok(saved) => saved,
        Err(e) => {
            warn!(language = %language, error = %e, "Autosave failed");
            false
        }
    }
}

pub struct AutosaveHandle {
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        // Drop aborts the task
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start the repeating autosave task; the first tick fires one `period` from now
pub fn spawn_autosave(
    session: Arc<Mutex<Session>>,
    drafts: DraftStore,
    store: Arc<dyn KeyValueStore>,
    period: Duration,
) -> AutosaveHandle {
    debug!(period_ms = period.as_millis() as u64, "Starting autosave");
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            autosave_once(&session, &drafts, store.as_ref()).await;
        }
    });
    AutosaveHandle { task }
}
