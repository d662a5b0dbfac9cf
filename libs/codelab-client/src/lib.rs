//! Client core for the CodeNextLab practice service: draft persistence,
//! language switching, code execution, submission history and theme
//! preference, wired together by [`workbench::Workbench`].

pub mod autosave;
pub mod draft;
pub mod editor;
pub mod error;
pub mod execution;
pub mod history;
pub mod output;
pub mod prompt;
pub mod session;
pub mod store;
pub mod theme;
pub mod transport;
pub mod workbench;

pub use codelab_common as common;
