//! Severity-graded results of the precondition checks.

use std::fmt;

use jolt_core::{FileId, TextRange};
use jolt_index::MethodId;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// Something the checks found wrong with the requested signature or with the
/// code it would produce. The `Display` text is the user facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Problem {
    #[error("the method no longer exists in `{file}`")]
    MethodNotFound { file: FileId },
    #[error("`{method}` is declared in interface `{interface}`; change the signature there instead")]
    DeclaredInInterface { method: String, interface: String },
    #[error("`{method}` overrides a method declared in `{declaring}`; change the signature there instead")]
    OverridesAnother { method: String, declaring: String },
    #[error("cannot resolve thrown exception type `{name}`")]
    UnresolvedException { name: String },

    #[error("nothing changed: the new signature is identical to the original")]
    Unchanged,
    #[error("duplicate parameter name `{name}`")]
    DuplicateParameterName { name: String },
    #[error("enter a type for parameter `{name}`")]
    MissingParameterType { name: String },
    #[error("enter a name for the new parameter")]
    MissingParameterName,
    #[error("`{ty}` is not a valid parameter type")]
    InvalidParameterType { ty: String },
    #[error("`{ty}` is not a valid return type")]
    InvalidReturnType { ty: String },
    #[error("`{name}` is not a valid Java identifier")]
    InvalidIdentifier { name: String },
    #[error("parameter name `{name}` should start with a lowercase letter")]
    ParameterNameConvention { name: String },
    #[error("method name `{name}` should start with a lowercase letter")]
    MethodNameConvention { name: String },
    #[error("enter a default value for the new parameter `{name}`")]
    MissingDefaultValue { name: String },
    #[error("`{value}` is not a valid default value expression")]
    InvalidDefaultValue { value: String },
    #[error("`{name}` is the name of the declaring type; only constructors may use it")]
    MethodNamedLikeType { name: String },

    #[error("`{method}` is overridden; making it private breaks the overriding methods")]
    PrivateWithOverriders { method: String },
    #[error("cannot reorder the parameters of native method `{method}` in `{declaring}`")]
    NativeReorder { method: String, declaring: String },
    #[error("`{method}` in `{declaring}` already has a parameter named `{name}`")]
    ParameterNameCollision {
        method: String,
        declaring: String,
        name: String,
    },
    #[error("type `{name}` cannot be resolved")]
    TypeNotFound { name: String },
    #[error("type name `{name}` is ambiguous: {candidates}")]
    AmbiguousType { name: String, candidates: String },
    #[error("{message}")]
    CompileError { code: &'static str, message: String },
    #[error("`{file}` is read-only")]
    ReadOnlyFile { file: FileId },

    #[error("parameter `{name}` is still used in the body of `{method}` in {declaring}")]
    DeletedParameterStillUsed {
        name: String,
        method: String,
        declaring: String,
    },
    #[error("cannot update occurrence at {position}: {text}")]
    UnrecognizedOccurrence { position: String, text: String },
}

/// Where a problem is located.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StatusContext {
    pub file: FileId,
    pub range: Option<TextRange>,
}

impl StatusContext {
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self {
            file,
            range: Some(range),
        }
    }

    pub fn file(file: FileId) -> Self {
        Self { file, range: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub severity: Severity,
    pub problem: Problem,
    pub context: Option<StatusContext>,
    /// The method the caller should run the refactoring on instead.
    pub alternate: Option<MethodId>,
}

impl StatusEntry {
    pub fn new(severity: Severity, problem: Problem) -> Self {
        Self {
            severity,
            problem,
            context: None,
            alternate: None,
        }
    }

    pub fn with_context(mut self, context: StatusContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_alternate(mut self, method: MethodId) -> Self {
        self.alternate = Some(method);
        self
    }

    pub fn message(&self) -> String {
        self.problem.to_string()
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.problem)
    }
}

/// The accumulated outcome of one or more checks.
///
/// Entries keep the order they were reported in. A fatal entry means the
/// refactoring cannot proceed; errors and warnings leave the decision to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefactoringStatus {
    entries: Vec<StatusEntry>,
    cancelled: bool,
}

impl RefactoringStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fatal(problem: Problem) -> Self {
        let mut status = Self::new();
        status.push(StatusEntry::new(Severity::Fatal, problem));
        status
    }

    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    pub fn add(&mut self, severity: Severity, problem: Problem, context: Option<StatusContext>) {
        self.push(StatusEntry {
            severity,
            problem,
            context,
            alternate: None,
        });
    }

    pub fn add_fatal(&mut self, problem: Problem, context: Option<StatusContext>) {
        self.add(Severity::Fatal, problem, context);
    }

    pub fn add_error(&mut self, problem: Problem, context: Option<StatusContext>) {
        self.add(Severity::Error, problem, context);
    }

    pub fn add_warning(&mut self, problem: Problem, context: Option<StatusContext>) {
        self.add(Severity::Warning, problem, context);
    }

    pub fn add_info(&mut self, problem: Problem, context: Option<StatusContext>) {
        self.add(Severity::Info, problem, context);
    }

    pub fn merge(&mut self, other: RefactoringStatus) {
        self.entries.extend(other.entries);
        self.cancelled |= other.cancelled;
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn entries_with(&self, severity: Severity) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter().filter(move |entry| entry.severity == severity)
    }

    /// The highest severity reported, `None` for a clean status.
    pub fn severity(&self) -> Option<Severity> {
        self.entries.iter().map(|entry| entry.severity).max()
    }

    pub fn is_ok(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_fatal(&self) -> bool {
        self.severity() == Some(Severity::Fatal)
    }

    /// Errors or worse.
    pub fn has_error(&self) -> bool {
        self.severity() >= Some(Severity::Error)
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Only the first fatal entry. A fatal ends checking, so warnings and
    /// errors gathered before it are dropped.
    pub(crate) fn into_fatal(self) -> Self {
        let entries = self
            .entries
            .into_iter()
            .find(|entry| entry.severity == Severity::Fatal)
            .into_iter()
            .collect();
        Self {
            entries,
            cancelled: self.cancelled,
        }
    }

    /// The first entry with the highest severity.
    pub fn most_severe(&self) -> Option<&StatusEntry> {
        let severity = self.severity()?;
        self.entries.iter().find(|entry| entry.severity == severity)
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(StatusEntry::message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_is_the_maximum_entry() {
        let mut status = RefactoringStatus::new();
        assert_eq!(status.severity(), None);
        assert!(!status.has_error());

        status.add_warning(Problem::MethodNameConvention { name: "M".into() }, None);
        assert_eq!(status.severity(), Some(Severity::Warning));
        assert!(!status.has_error());

        status.add_error(Problem::TypeNotFound { name: "Foo".into() }, None);
        assert!(status.has_error());
        assert!(!status.has_fatal());
        assert_eq!(
            status.most_severe().map(StatusEntry::message),
            Some("type `Foo` cannot be resolved".to_string())
        );
    }

    #[test]
    fn merge_keeps_order_and_cancellation() {
        let mut first = RefactoringStatus::fatal(Problem::Unchanged);
        let mut second = RefactoringStatus::new();
        second.add_info(Problem::MissingParameterName, None);
        second.mark_cancelled();
        first.merge(second);
        assert_eq!(
            first.entries().iter().map(|e| e.severity).collect::<Vec<_>>(),
            vec![Severity::Fatal, Severity::Info]
        );
        assert!(first.was_cancelled());
    }

    #[test]
    fn a_fatal_status_keeps_only_the_fatal_entry() {
        let mut status = RefactoringStatus::new();
        status.add_warning(Problem::ParameterNameConvention { name: "Big".into() }, None);
        status.add_fatal(Problem::InvalidIdentifier { name: "1x".into() }, None);
        status.add_fatal(Problem::Unchanged, None);
        let status = status.into_fatal();
        assert_eq!(
            status.messages(),
            vec![Problem::InvalidIdentifier { name: "1x".into() }.to_string()]
        );
    }
}
