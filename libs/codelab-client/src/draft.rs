// Per-language draft persistence

use crate::error::StoreError;
use crate::store::KeyValueStore;
use codelab_common::keys::draft_key;
use codelab_common::types::Language;
use std::sync::Arc;
use tracing::trace;

/// At most one draft per language, overwritten on every save.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store `code` as the draft for `language`.
    ///
    /// Blank buffers are skipped so a transiently empty editor never
    /// clobbers a saved draft. Returns whether anything was written.
    pub fn save(&self, language: &Language, code: &str) -> Result<bool, StoreError> {
        if code.trim().is_empty() {
            trace!(language = %language, "Skipping blank draft");
            return Ok(false);
        }
        self.store.set(&draft_key(language), code)?;
        trace!(language = %language, bytes = code.len(), "Draft saved");
        Ok(true)
    }

    /// Saved draft for `language`; an empty stored value counts as absent
    pub fn load(&self, language: &Language) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(&draft_key(language))?
            .filter(|code| !code.is_empty()))
    }
}
