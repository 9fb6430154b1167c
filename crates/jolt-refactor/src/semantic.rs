//! The services the change-signature engine consumes.
//!
//! The engine never talks to a concrete workspace directly. Everything it needs
//! (parsing, hierarchy searches, type lookups, the model and the final commit)
//! goes through these traits, which [`jolt_index::Workspace`] implements.

use std::sync::Arc;

use jolt_core::{FileId, WorkspaceEdit};
use jolt_index::{
    AnnotatedUnit, Cancelled, CommitError, MethodId, MethodInfo, Model, TypeId, TypeInfo, Workspace,
};
use jolt_syntax::ast::NodeId;
use jolt_syntax::Diagnostic;
use tokio_util::sync::CancellationToken;

/// Nodes of one file bound to the searched methods, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceGroup {
    pub file: FileId,
    pub nodes: Vec<NodeId>,
}

pub trait JavaParser {
    /// The parsed and bound unit for `file` as currently stored.
    fn parse(&self, file: &FileId) -> Option<Arc<AnnotatedUnit>>;

    /// Parse and bind `text` as if it were the content of `file`.
    fn reparse(&self, file: &FileId, text: &str) -> Option<Arc<AnnotatedUnit>>;

    /// Compile diagnostics for `file` holding `text`.
    ///
    /// The default implementation reparses and collects the unit's diagnostics.
    fn diagnostics(&self, file: &FileId, text: &str) -> Vec<Diagnostic> {
        self.reparse(file, text)
            .map(|unit| unit.diagnostics())
            .unwrap_or_default()
    }
}

pub trait SearchEngine {
    fn override_family(
        &self,
        method: MethodId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MethodId>, Cancelled>;

    /// Every node bound to one of `methods`, declarations included, grouped per file.
    fn occurrences(
        &self,
        methods: &[MethodId],
        cancel: &CancellationToken,
    ) -> Result<Vec<OccurrenceGroup>, Cancelled>;

    /// Named source classes whose super class is `ty`.
    fn subclasses(&self, ty: TypeId) -> Vec<TypeId>;
}

pub trait TypeLookup {
    /// Qualified names `name` may denote when written inside `ty`.
    fn resolve_in_type(&self, ty: TypeId, type_vars: &[String], name: &str) -> Vec<String>;

    /// Qualified names of the types called `simple_name` that code in
    /// `from_package` can see.
    fn visible_types(&self, simple_name: &str, from_package: &str) -> Vec<String>;
}

pub trait ChangeSink {
    fn text(&self, file: &FileId) -> Option<Arc<str>>;

    fn is_writable(&self, file: &FileId) -> bool;

    /// Apply `edit` to every file it touches, or to none.
    fn commit(&mut self, edit: &WorkspaceEdit) -> Result<(), CommitError>;
}

pub trait SemanticModel {
    fn model(&self) -> &Model;

    fn method(&self, id: MethodId) -> &MethodInfo {
        self.model().method(id)
    }

    fn type_info(&self, id: TypeId) -> &TypeInfo {
        self.model().type_info(id)
    }

    /// Qualified name, or `anonymous subclass of 'Base'`.
    fn type_name(&self, id: TypeId) -> String {
        self.model().type_name(id)
    }
}

pub trait RefactorDatabase: JavaParser + SearchEngine + TypeLookup + SemanticModel + ChangeSink {}

impl<T> RefactorDatabase for T where
    T: JavaParser + SearchEngine + TypeLookup + SemanticModel + ChangeSink
{
}

impl JavaParser for Workspace {
    fn parse(&self, file: &FileId) -> Option<Arc<AnnotatedUnit>> {
        self.unit(file)
    }

    fn reparse(&self, file: &FileId, text: &str) -> Option<Arc<AnnotatedUnit>> {
        self.with_file_text(file, text).unit(file)
    }
}

impl SearchEngine for Workspace {
    fn override_family(
        &self,
        method: MethodId,
        cancel: &CancellationToken,
    ) -> Result<Vec<MethodId>, Cancelled> {
        Workspace::override_family(self, method, cancel)
    }

    fn occurrences(
        &self,
        methods: &[MethodId],
        cancel: &CancellationToken,
    ) -> Result<Vec<OccurrenceGroup>, Cancelled> {
        let found = Workspace::occurrences(self, methods, cancel)?;
        Ok(found
            .into_iter()
            .map(|(file, nodes)| OccurrenceGroup { file, nodes })
            .collect())
    }

    fn subclasses(&self, ty: TypeId) -> Vec<TypeId> {
        self.direct_subclasses(ty)
    }
}

impl TypeLookup for Workspace {
    fn resolve_in_type(&self, ty: TypeId, type_vars: &[String], name: &str) -> Vec<String> {
        self.model().resolve_in_type(ty, type_vars, name)
    }

    fn visible_types(&self, simple_name: &str, from_package: &str) -> Vec<String> {
        self.model().visible_types(simple_name, from_package)
    }
}

impl ChangeSink for Workspace {
    fn text(&self, file: &FileId) -> Option<Arc<str>> {
        self.file_text(file)
    }

    fn is_writable(&self, file: &FileId) -> bool {
        self.file_text(file).is_some() && !self.is_read_only(file)
    }

    fn commit(&mut self, edit: &WorkspaceEdit) -> Result<(), CommitError> {
        Workspace::commit(self, edit)
    }
}

impl SemanticModel for Workspace {
    fn model(&self) -> &Model {
        Workspace::model(self)
    }
}
