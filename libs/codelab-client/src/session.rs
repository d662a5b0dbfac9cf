/// Session State + Language Mode Switch
///
/// `Session` replaces the page globals (current language, editor handle).
/// The switch operations take it explicitly:
/// - `select_language`: bind the language, pick the syntax mode, and show
///   its draft or boilerplate
/// - `reset_code`: confirmation-gated restore of the boilerplate
///
/// Invariant after `select_language(L)`: the editor shows L's draft when
/// one is stored, else L's boilerplate.

use crate::draft::DraftStore;
use crate::editor::{boilerplate, syntax_mode, Editor};
use crate::prompt::Confirmer;
use crate::store::KeyValueStore;
use codelab_common::keys::CURRENT_LANGUAGE_KEY;
use codelab_common::types::Language;
use tracing::{debug, warn};

pub const RESET_CONFIRMATION: &str =
    "Are you sure you want to reset the editor? This will clear your current code.";

pub struct Session {
    language: Language,
    editor: Box<dyn Editor>,
}

impl Session {
    pub fn new(language: Language, mut editor: Box<dyn Editor>) -> Self {
        editor.set_mode(syntax_mode(&language));
        Self { language, editor }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn editor(&self) -> &dyn Editor {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> &mut dyn Editor {
        self.editor.as_mut()
    }
}

/// Make `language` the active one and resolve the editor content
pub fn select_language(session: &mut Session, drafts: &DraftStore, language: Language) {
    let mode = syntax_mode(&language);
    session.editor.set_mode(mode);

    let draft = drafts.load(&language).unwrap_or_else(|e| {
        warn!(language = %language, error = %e, "Failed to load draft; using boilerplate");
        None
    });

    match draft {
        Some(code) => {
            debug!(language = %language, mode = mode.as_str(), "Restored saved draft");
            session.editor.set_text(&code);
        }
        None => {
            debug!(language = %language, mode = mode.as_str(), "No draft; showing boilerplate");
            session.editor.set_text(boilerplate(&language));
        }
    }

    session.language = language;
}

/// Bind `language` without touching the editor content
pub fn adopt_language(session: &mut Session, language: Language) {
    session.editor.set_mode(syntax_mode(&language));
    session.language = language;
}

/// The persisted current language, if one is stored and readable
pub fn persisted_language(store: &dyn KeyValueStore) -> Option<Language> {
    match store.get(CURRENT_LANGUAGE_KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => Some(Language::from(raw)),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read current language");
            None
        }
    }
}

/// Restore the active language's boilerplate after an explicit yes.
/// Returns whether the editor was reset.
pub fn reset_code(session: &mut Session, confirmer: &dyn Confirmer) -> bool {
    if !confirmer.confirm(RESET_CONFIRMATION) {
        debug!(language = %session.language, "Reset declined");
        return false;
    }
    let code = boilerplate(&session.language);
    session.editor.set_text(code);
    true
}
