use crate::types::Language;

/// Persisted-state key semantics - shared by every store implementation
/// so drafts written by one front end are found by another.

pub const DRAFT_PREFIX: &str = "practice_code";
pub const THEME_KEY: &str = "theme";
pub const CURRENT_LANGUAGE_KEY: &str = "current_language";

/// Deterministic draft key for a language
pub fn draft_key(language: &Language) -> String {
    format!("{}_{}", DRAFT_PREFIX, language)
}
