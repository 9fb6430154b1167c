//! Core shared types for Jolt.
//!
//! This crate is intentionally small: file identities, byte ranges, text edits and
//! line/column mapping. Everything else in the workspace builds on these.

mod edit;
mod text;

pub use edit::{apply_text_edits, EditError, FileId, TextEdit, TextRange, WorkspaceEdit};
pub use text::{LineCol, LineIndex};
