mod checks;
mod hierarchy;
mod references;
mod signature;

use jolt_core::FileId;
use jolt_index::{MethodId, Workspace};
use jolt_refactor::{Change, ChangeSignature, ChangeSignatureOptions, Problem, RefactoringStatus};
use tokio_util::sync::CancellationToken;

/// The unique method `Type.name` declared in source. Constructors are
/// found by their type name.
pub(crate) fn method(workspace: &Workspace, ty: &str, name: &str) -> MethodId {
    let found = workspace.find_methods(ty, name, None);
    assert_eq!(found.len(), 1, "expected one {ty}.{name}, found {found:?}");
    found[0]
}

pub(crate) struct Outcome {
    pub status: RefactoringStatus,
    pub change: Option<Change>,
}

impl Outcome {
    pub fn problems(&self) -> Vec<&Problem> {
        self.status.entries().iter().map(|entry| &entry.problem).collect()
    }

    /// The changed text of `file`.
    pub fn preview(&self, file: &str) -> String {
        let change = self.change.as_ref().expect("a change was created");
        change.preview(&FileId::new(file)).expect("preview")
    }

    pub fn touches(&self, file: &str) -> bool {
        self.change
            .as_ref()
            .is_some_and(|change| change.unit(&FileId::new(file)).is_some())
    }
}

/// Runs the refactoring on `Type.name` with default options: activation,
/// then `edit`, then the input check. The change is created unless a check
/// was fatal.
pub(crate) fn change_signature(
    workspace: &Workspace,
    ty: &str,
    name: &str,
    edit: impl FnOnce(&mut ChangeSignature<'_>),
) -> Outcome {
    change_signature_with(workspace, ty, name, ChangeSignatureOptions::default(), edit)
}

pub(crate) fn change_signature_with(
    workspace: &Workspace,
    ty: &str,
    name: &str,
    options: ChangeSignatureOptions,
    edit: impl FnOnce(&mut ChangeSignature<'_>),
) -> Outcome {
    let cancel = CancellationToken::new();
    let mut refactoring = ChangeSignature::new(workspace, method(workspace, ty, name), options)
        .expect("refactoring");
    let mut status = refactoring.check_activation(&cancel);
    if status.has_fatal() {
        return Outcome { status, change: None };
    }
    edit(&mut refactoring);
    status.merge(refactoring.check_input(&cancel));
    if status.has_fatal() {
        return Outcome { status, change: None };
    }
    let change = refactoring.create_change().expect("fresh session");
    Outcome {
        status,
        change: Some(change),
    }
}
