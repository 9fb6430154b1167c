//! Change Method Signature.
//!
//! A [`ChangeSignature`] is created for one method, edited through its
//! [`SignatureState`] (or a whole [`ChangeSignatureRequest`]), and then driven
//! through [`ChangeSignature::check_activation`],
//! [`ChangeSignature::check_input`] and [`ChangeSignature::create_change`].
//!
//! The change covers the whole override family: every declaration, call,
//! `new` expression, explicit constructor call, enum constant and doc
//! reference bound to a family member is rewritten. When a no-argument
//! constructor gains parameters, subclasses that relied on the implicit
//! `super()` call are updated too.

mod checks;
mod model;
mod occurrence;
mod request;
mod ripple;
mod state;
mod validate;

use std::collections::{BTreeSet, HashSet};

use jolt_config::ChangeSignatureConfig;
use jolt_core::FileId;
use jolt_index::{MethodId, TypeId};
use jolt_syntax::ast::{NodeId, TypeKind, Visibility};
use tokio_util::sync::CancellationToken;

pub use model::{ExceptionChange, ExceptionInfo, ParameterInfo};
pub use request::{ChangeSignatureRequest, ParameterOperation};
pub use state::SignatureState;

use crate::change::{Change, ADD_IMPORTS, MODIFY_PARAMETERS};
use crate::error::RefactorError;
use crate::semantic::{OccurrenceGroup, RefactorDatabase};
use crate::status::RefactoringStatus;
use occurrence::{Target, UnitRewriter};

/// Behaviour switches, usually taken from `[refactor.change_signature]` in
/// `jolt.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSignatureOptions {
    /// Reject changes that introduce compile errors in the declaring file.
    pub compile_check: bool,
    /// Rewrite `{@link}` and `@see` references as well.
    pub update_doc_references: bool,
    /// Import new types instead of writing qualified names.
    pub add_imports: bool,
    /// Add `super(..)` calls to subclasses when a no-argument constructor
    /// gains parameters.
    pub ripple_constructors: bool,
}

impl Default for ChangeSignatureOptions {
    fn default() -> Self {
        Self {
            compile_check: true,
            update_doc_references: true,
            add_imports: true,
            ripple_constructors: true,
        }
    }
}

impl From<&ChangeSignatureConfig> for ChangeSignatureOptions {
    fn from(config: &ChangeSignatureConfig) -> Self {
        Self {
            compile_check: config.compile_check,
            update_doc_references: config.update_doc_references,
            add_imports: config.add_imports,
            ripple_constructors: config.ripple_constructors,
        }
    }
}

/// What a successful input check computed, valid for one state version.
#[derive(Debug, Clone)]
struct Session {
    version: u64,
    family: Vec<MethodId>,
    occurrences: Vec<OccurrenceGroup>,
    change: Change,
}

pub struct ChangeSignature<'db> {
    db: &'db dyn RefactorDatabase,
    method: MethodId,
    file: FileId,
    node: NodeId,
    options: ChangeSignatureOptions,
    state: SignatureState,
    session: Option<Session>,
}

impl<'db> ChangeSignature<'db> {
    /// Whether the refactoring can be started on `method` at all: it must be
    /// declared in source.
    pub fn is_available(db: &dyn RefactorDatabase, method: MethodId) -> bool {
        db.model()
            .methods()
            .find(|info| info.id == method)
            .is_some_and(|info| info.origin.is_source())
    }

    pub fn new(
        db: &'db dyn RefactorDatabase,
        method: MethodId,
        options: ChangeSignatureOptions,
    ) -> Result<Self, RefactorError> {
        let model = db.model();
        let info = model
            .methods()
            .find(|info| info.id == method)
            .ok_or(RefactorError::UnknownMethod(method))?;
        let (Some(file), Some(node)) = (info.origin.file(), info.origin.node()) else {
            return Err(RefactorError::NotInSource(model.method_label(method)));
        };
        tracing::debug!(
            target: "jolt.refactor",
            method = %model.method_label(method),
            "change signature"
        );
        Ok(Self {
            db,
            method,
            file: file.clone(),
            node,
            options,
            state: SignatureState::from_method(info),
            session: None,
        })
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn options(&self) -> ChangeSignatureOptions {
        self.options
    }

    pub fn state(&self) -> &SignatureState {
        &self.state
    }

    /// Parameter and exception edits go straight to the state.
    pub fn state_mut(&mut self) -> &mut SignatureState {
        &mut self.state
    }

    fn label(&self) -> String {
        self.db.model().method_label(self.method)
    }

    fn declaring_type(&self) -> TypeId {
        self.db.method(self.method).declaring_type
    }

    /// Interface methods stay public; enum constructors cannot be widened.
    pub fn available_visibilities(&self) -> Vec<Visibility> {
        let info = self.db.method(self.method);
        let owner = self.db.type_info(info.declaring_type);
        if owner.is_interface() {
            vec![Visibility::Public]
        } else if owner.kind == TypeKind::Enum && info.is_constructor {
            vec![Visibility::Package, Visibility::Private]
        } else {
            Visibility::ALL.to_vec()
        }
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> Result<(), RefactorError> {
        if !self.available_visibilities().contains(&visibility) {
            return Err(RefactorError::VisibilityNotAvailable(visibility));
        }
        self.state.set_visibility(visibility);
        Ok(())
    }

    pub fn set_method_name(&mut self, name: &str) -> Result<(), RefactorError> {
        if self.state.is_constructor() {
            return Err(RefactorError::ConstructorSignature(self.label()));
        }
        self.state.set_name(name);
        Ok(())
    }

    pub fn set_return_type(&mut self, ty: &str) -> Result<(), RefactorError> {
        if self.state.is_constructor() {
            return Err(RefactorError::ConstructorSignature(self.label()));
        }
        self.state.set_return_type(ty);
        Ok(())
    }

    /// Apply a whole request. Call it after [`Self::check_activation`] so the
    /// declared exceptions are known when the request removes one.
    pub fn apply_request(&mut self, request: &ChangeSignatureRequest) -> Result<(), RefactorError> {
        request.apply_to(&mut self.state)?;
        if let Some(name) = &request.new_name {
            self.set_method_name(name)?;
        }
        if let Some(ty) = &request.new_return_type {
            self.set_return_type(ty)?;
        }
        if let Some(visibility) = request.new_visibility {
            self.set_visibility(visibility)?;
        }
        Ok(())
    }

    /// The signature as it will read after the change.
    pub fn signature_preview(&self) -> String {
        self.state.preview()
    }

    /// The override family found by the last input check.
    pub fn override_family(&self) -> Option<&[MethodId]> {
        self.session.as_ref().map(|session| session.family.as_slice())
    }

    /// Files holding occurrences, as found by the last input check.
    pub fn occurrence_files(&self) -> Vec<&FileId> {
        self.session
            .as_ref()
            .map(|session| session.occurrences.iter().map(|group| &group.file).collect())
            .unwrap_or_default()
    }

    /// Activation followed by input checking, stopping at the first fatal
    /// problem.
    pub fn check_all(&mut self, cancel: &CancellationToken) -> RefactoringStatus {
        let mut status = self.check_activation(cancel);
        if status.has_fatal() || status.was_cancelled() {
            return status;
        }
        status.merge(self.check_input(cancel));
        status
    }

    /// The change computed by the last input check.
    ///
    /// Fails with [`RefactorError::StaleSession`] when there was no check or
    /// the state was edited since. The session is consumed.
    pub fn create_change(&mut self) -> Result<Change, RefactorError> {
        let session = self.session.take().ok_or(RefactorError::StaleSession)?;
        if session.version != self.state.version() {
            tracing::debug!(
                target: "jolt.refactor",
                checked = session.version,
                current = self.state.version(),
                "stale change signature session"
            );
            return Err(RefactorError::StaleSession);
        }
        tracing::info!(
            target: "jolt.refactor",
            method = %self.label(),
            files = session.change.units().count(),
            edits = session.change.edit_count(),
            "created change"
        );
        Ok(session.change)
    }

    /// Rewrite every occurrence. The returned status carries the problems
    /// found while rewriting and whether `cancel` cut the work short.
    fn build_change(
        &self,
        occurrences: &[OccurrenceGroup],
        cancel: &CancellationToken,
    ) -> (Change, RefactoringStatus) {
        let db = self.db;
        let model = db.model();
        let target = Target {
            db,
            state: &self.state,
            method: model.method(self.method),
            options: self.options,
        };
        let mut change = Change::new(format!("Change signature of {}", self.label()));
        let mut status = RefactoringStatus::new();

        let ripple = ripple::subclasses_to_update(&target);
        let arguments = ripple::super_arguments(&target);
        let files: BTreeSet<&FileId> = occurrences
            .iter()
            .map(|group| &group.file)
            .chain(ripple.keys())
            .collect();

        for file in files {
            if cancel.is_cancelled() {
                status.mark_cancelled();
                break;
            }
            let Some(unit) = db.parse(file) else {
                tracing::warn!(target: "jolt.refactor", %file, "occurrence file is gone");
                continue;
            };
            let nodes: HashSet<NodeId> = occurrences
                .iter()
                .filter(|group| &group.file == file)
                .flat_map(|group| group.nodes.iter().copied())
                .collect();

            let mut rewriter = UnitRewriter::new(target, &unit);
            let completed = rewriter.rewrite_occurrences(&nodes, cancel);
            if completed {
                for &ty in ripple.get(file).into_iter().flatten() {
                    let info = model.type_info(ty);
                    let decl = info.origin.node().and_then(|node| unit.type_decl(node));
                    if let Some(decl) = decl {
                        rewriter.ripple_subclass(decl, info.visibility, &arguments);
                    }
                }
            }
            let (edits, imports, unit_status) = rewriter.finish();
            change.add_group(file, &unit.text, MODIFY_PARAMETERS, edits);
            change.add_group(file, &unit.text, ADD_IMPORTS, imports);
            status.merge(unit_status);
            if !completed {
                status.mark_cancelled();
                break;
            }
        }
        (change, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_index::Workspace;
    use pretty_assertions::assert_eq;

    fn find(workspace: &Workspace, ty: &str, name: &str) -> MethodId {
        workspace.find_methods(ty, name, None)[0]
    }

    #[test]
    fn options_follow_the_config() {
        let config = ChangeSignatureConfig {
            compile_check: false,
            update_doc_references: true,
            add_imports: false,
            ripple_constructors: true,
        };
        let options = ChangeSignatureOptions::from(&config);
        assert!(!options.compile_check);
        assert!(!options.add_imports);
        assert!(options.update_doc_references && options.ripple_constructors);
    }

    #[test]
    fn constructors_keep_their_name_and_return_type() {
        let workspace = Workspace::from_files([("A.java", "class A { A() {} }")]);
        let mut refactoring = ChangeSignature::new(
            &workspace,
            find(&workspace, "A", "A"),
            ChangeSignatureOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            refactoring.set_method_name("B"),
            Err(RefactorError::ConstructorSignature(_))
        ));
        assert!(matches!(
            refactoring.set_return_type("int"),
            Err(RefactorError::ConstructorSignature(_))
        ));
    }

    #[test]
    fn interface_methods_only_offer_public() {
        let workspace = Workspace::from_files([("I.java", "interface I { void m(); }")]);
        let mut refactoring = ChangeSignature::new(
            &workspace,
            find(&workspace, "I", "m"),
            ChangeSignatureOptions::default(),
        )
        .unwrap();
        assert_eq!(refactoring.available_visibilities(), vec![Visibility::Public]);
        assert_eq!(
            refactoring.set_visibility(Visibility::Private),
            Err(RefactorError::VisibilityNotAvailable(Visibility::Private))
        );
    }

    #[test]
    fn library_methods_are_not_available() {
        let workspace = Workspace::from_files([("A.java", "class A {}")]);
        let to_string = workspace
            .model()
            .methods()
            .find(|info| !info.origin.is_source() && info.name == "toString")
            .map(|info| info.id)
            .unwrap();
        assert!(!ChangeSignature::is_available(&workspace, to_string));
        assert!(matches!(
            ChangeSignature::new(&workspace, to_string, ChangeSignatureOptions::default()),
            Err(RefactorError::NotInSource(_))
        ));
    }

    #[test]
    fn create_change_needs_a_fresh_check() {
        let workspace = Workspace::from_files([("A.java", "class A { void m(int a) {} }")]);
        let mut refactoring = ChangeSignature::new(
            &workspace,
            find(&workspace, "A", "m"),
            ChangeSignatureOptions::default(),
        )
        .unwrap();
        assert_eq!(refactoring.create_change(), Err(RefactorError::StaleSession));

        refactoring.state_mut().rename_parameter(0, "b").unwrap();
        let status = refactoring.check_all(&CancellationToken::new());
        assert!(status.is_ok(), "{:?}", status.messages());
        refactoring.state_mut().rename_parameter(0, "c").unwrap();
        assert_eq!(refactoring.create_change(), Err(RefactorError::StaleSession));
    }
}
