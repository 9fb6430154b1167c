use jolt_core::{EditError, FileId};
use jolt_index::{CommitError, MethodId};
use jolt_syntax::ast::Visibility;
use thiserror::Error;

/// Misuse of the refactoring API or a failure to apply its result.
///
/// Problems with the requested signature itself are not errors; they are
/// reported through [`crate::RefactoringStatus`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefactorError {
    #[error("unknown method {0:?}")]
    UnknownMethod(MethodId),
    #[error("`{0}` is not declared in source and cannot be refactored")]
    NotInSource(String),
    #[error("`{0}` is a constructor; its name and return type cannot change")]
    ConstructorSignature(String),
    #[error("visibility `{0}` is not available for this method")]
    VisibilityNotAvailable(Visibility),
    #[error("parameter index {index} is out of range (the method has {count} parameters)")]
    InvalidParameterIndex { index: usize, count: usize },
    #[error("parameter index {0} is listed more than once")]
    DuplicateParameterIndex(usize),
    #[error("the signature changed after the last input check; check again before creating the change")]
    StaleSession,
    #[error("the change does not touch `{0}`")]
    FileNotInChange(FileId),
    #[error("`{0}` was modified after the change was computed")]
    FileChanged(FileId),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Commit(#[from] CommitError),
}
