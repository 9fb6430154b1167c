//! Signature refactoring for Java sources.
//!
//! The entry point is [`ChangeSignature`]: it checks a requested signature
//! against the method, its override family and every occurrence, and produces
//! a [`Change`] of grouped text edits that can be previewed or committed
//! through a [`ChangeSink`].
//!
//! The engine only depends on the traits in [`semantic`], which
//! `jolt_index::Workspace` implements.

mod change;
mod change_signature;
mod error;
mod imports;
mod preview;
mod rewrite;
pub mod semantic;
mod status;

pub use change::{Change, EditGroup, UnitChange, ADD_IMPORTS, MODIFY_PARAMETERS};
pub use change_signature::{
    ChangeSignature, ChangeSignatureOptions, ChangeSignatureRequest, ExceptionChange, ExceptionInfo,
    ParameterInfo, ParameterOperation, SignatureState,
};
pub use error::RefactorError;
pub use preview::FilePreview;
pub use semantic::{
    ChangeSink, JavaParser, OccurrenceGroup, RefactorDatabase, SearchEngine, SemanticModel,
    TypeLookup,
};
pub use status::{Problem, RefactoringStatus, Severity, StatusContext, StatusEntry};
