use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use jolt_core::{apply_text_edits, EditError, FileId, LineCol, LineIndex, TextRange, WorkspaceEdit};
use jolt_syntax::ast::{CompilationUnit, MethodDecl, NodeId, TypeDecl};
use jolt_syntax::visit;
use jolt_syntax::{Diagnostic, Parse};
use thiserror::Error;

use crate::bind::{bind_file, FileBindings};
use crate::declare::build_model;
use crate::model::{MethodId, Model};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("file `{0}` is read-only")]
    ReadOnly(FileId),
    #[error("unknown file `{0}`")]
    UnknownFile(FileId),
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// A parsed and bound compilation unit.
#[derive(Debug)]
pub struct AnnotatedUnit {
    pub file: FileId,
    pub text: Arc<str>,
    pub parse: Arc<Parse>,
    pub bindings: FileBindings,
    semantic: Vec<Diagnostic>,
    line_index: LineIndex,
}

impl AnnotatedUnit {
    pub fn unit(&self) -> &CompilationUnit {
        self.parse.compilation_unit()
    }

    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(range.start..range.end).unwrap_or("")
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        self.line_index.line_col(offset)
    }

    /// Syntax errors followed by semantic errors, each sorted by position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = self.parse.diagnostics().to_vec();
        out.extend(self.semantic.iter().cloned());
        out
    }

    pub fn method_decl(&self, node: NodeId) -> Option<&MethodDecl> {
        visit::all_methods(self.unit())
            .into_iter()
            .find(|method| method.id == node)
    }

    pub fn type_decl(&self, node: NodeId) -> Option<&TypeDecl> {
        visit::all_type_decls(self.unit())
            .into_iter()
            .find(|decl| decl.id == node)
    }
}

#[derive(Debug, Clone)]
struct SourceFile {
    text: Arc<str>,
    parse: Arc<Parse>,
}

#[derive(Debug)]
struct Analysis {
    model: Model,
    units: BTreeMap<FileId, Arc<AnnotatedUnit>>,
}

/// An in-memory set of Java sources with a declaration model and per-file
/// bindings kept in sync with the text.
#[derive(Debug, Clone)]
pub struct Workspace {
    files: BTreeMap<FileId, SourceFile>,
    read_only: BTreeSet<FileId>,
    analysis: Arc<Analysis>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::from_sources(BTreeMap::new(), BTreeSet::new())
    }

    pub fn from_files<P, T>(files: impl IntoIterator<Item = (P, T)>) -> Self
    where
        P: Into<String>,
        T: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|(path, text)| (FileId::new(path), source_file(text.into())))
            .collect();
        Self::from_sources(files, BTreeSet::new())
    }

    fn from_sources(files: BTreeMap<FileId, SourceFile>, read_only: BTreeSet<FileId>) -> Self {
        let analysis = Arc::new(analyze(&files));
        Self {
            files,
            read_only,
            analysis,
        }
    }

    fn reanalyze(&mut self) {
        self.analysis = Arc::new(analyze(&self.files));
    }

    /// Add or replace a file and rebuild the model.
    pub fn add_file(&mut self, file: FileId, text: impl Into<String>) {
        self.files.insert(file, source_file(text.into()));
        self.reanalyze();
    }

    pub fn set_read_only(&mut self, file: &FileId, read_only: bool) {
        if read_only {
            self.read_only.insert(file.clone());
        } else {
            self.read_only.remove(file);
        }
    }

    pub fn is_read_only(&self, file: &FileId) -> bool {
        self.read_only.contains(file)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.files.keys()
    }

    pub fn file_text(&self, file: &FileId) -> Option<Arc<str>> {
        self.files.get(file).map(|source| source.text.clone())
    }

    pub fn model(&self) -> &Model {
        &self.analysis.model
    }

    pub fn unit(&self, file: &FileId) -> Option<Arc<AnnotatedUnit>> {
        self.analysis.units.get(file).cloned()
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<AnnotatedUnit>> {
        self.analysis.units.values()
    }

    pub fn diagnostics(&self, file: &FileId) -> Vec<Diagnostic> {
        self.unit(file)
            .map(|unit| unit.diagnostics())
            .unwrap_or_default()
    }

    /// A copy of this workspace where `file` holds `text`; the copy is fully
    /// re-analyzed, the receiver is untouched.
    pub fn with_file_text(&self, file: &FileId, text: impl Into<String>) -> Workspace {
        let mut files = self.files.clone();
        files.insert(file.clone(), source_file(text.into()));
        Self::from_sources(files, self.read_only.clone())
    }

    /// Apply `edit` to every file it touches, or to none of them.
    pub fn commit(&mut self, edit: &WorkspaceEdit) -> Result<(), CommitError> {
        let mut updated = Vec::new();
        for (file, edits) in edit.edits_by_file() {
            if self.is_read_only(file) {
                return Err(CommitError::ReadOnly(file.clone()));
            }
            let Some(source) = self.files.get(file) else {
                return Err(CommitError::UnknownFile(file.clone()));
            };
            let edits: Vec<_> = edits.into_iter().cloned().collect();
            let text = apply_text_edits(&source.text, &edits)?;
            updated.push((file.clone(), text));
        }

        tracing::info!(
            target: "jolt.index",
            files = updated.len(),
            edits = edit.edits.len(),
            "committing workspace edit"
        );
        for (file, text) in updated {
            self.files.insert(file, source_file(text));
        }
        self.reanalyze();
        Ok(())
    }

    /// Methods named `name` declared in the type `type_name` (simple or
    /// qualified), optionally narrowed to an exact list of parameter types as
    /// written in the declaration.
    pub fn find_methods(
        &self,
        type_name: &str,
        name: &str,
        param_types: Option<&[String]>,
    ) -> Vec<MethodId> {
        let model = self.model();
        model
            .types()
            .filter(|ty| ty.origin.is_source())
            .filter(|ty| ty.qualified_name == type_name || ty.name == type_name)
            .flat_map(|ty| ty.methods.iter().copied())
            .filter(|&method| {
                let info = model.method(method);
                let same_name = if info.is_constructor {
                    name == model.type_info(info.declaring_type).name || name == "<init>"
                } else {
                    info.name == name
                };
                same_name
                    && param_types.map_or(true, |types| {
                        let written: Vec<String> =
                            types.iter().map(|ty| ty.replace(' ', "")).collect();
                        info.param_types == written
                    })
            })
            .collect()
    }

    /// The method or constructor whose declaration encloses `offset`,
    /// innermost first.
    pub fn method_at(&self, file: &FileId, offset: usize) -> Option<MethodId> {
        let unit = self.unit(file)?;
        let decl = visit::all_methods(unit.unit())
            .into_iter()
            .filter(|method| method.range.start <= offset && offset <= method.range.end)
            .min_by_key(|method| method.range.len())?;
        self.model().method_by_node(file, decl.id)
    }
}

fn source_file(text: String) -> SourceFile {
    let parse = Arc::new(jolt_syntax::parse(&text));
    SourceFile {
        text: Arc::from(text),
        parse,
    }
}

fn analyze(files: &BTreeMap<FileId, SourceFile>) -> Analysis {
    let sources: Vec<(FileId, Arc<Parse>)> = files
        .iter()
        .map(|(file, source)| (file.clone(), source.parse.clone()))
        .collect();
    let model = build_model(&sources);

    let units = files
        .iter()
        .map(|(file, source)| {
            let (bindings, mut semantic) = bind_file(&model, file, source.parse.compilation_unit());
            semantic.sort_by_key(|diagnostic| diagnostic.range.map(|range| range.start));
            let unit = AnnotatedUnit {
                file: file.clone(),
                text: source.text.clone(),
                parse: source.parse.clone(),
                bindings,
                semantic,
                line_index: LineIndex::new(&source.text),
            };
            (file.clone(), Arc::new(unit))
        })
        .collect();

    tracing::debug!(target: "jolt.index", files = files.len(), "analyzed workspace");
    Analysis { model, units }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_core::TextEdit;
    use pretty_assertions::assert_eq;

    #[test]
    fn commit_is_all_or_nothing() {
        let mut workspace = Workspace::from_files([
            ("A.java", "class A {}"),
            ("B.java", "class B {}"),
        ]);
        workspace.set_read_only(&FileId::new("B.java"), true);

        let edit = WorkspaceEdit::new(vec![
            TextEdit::replace(FileId::new("A.java"), TextRange::new(6, 7), "C"),
            TextEdit::replace(FileId::new("B.java"), TextRange::new(6, 7), "D"),
        ]);
        assert_eq!(
            workspace.commit(&edit),
            Err(CommitError::ReadOnly(FileId::new("B.java")))
        );
        assert_eq!(workspace.file_text(&FileId::new("A.java")).as_deref(), Some("class A {}"));

        workspace.set_read_only(&FileId::new("B.java"), false);
        workspace.commit(&edit).expect("commit");
        assert_eq!(workspace.file_text(&FileId::new("A.java")).as_deref(), Some("class C {}"));
        assert_eq!(workspace.file_text(&FileId::new("B.java")).as_deref(), Some("class D {}"));
        assert!(workspace.model().type_by_qualified_name("C").is_some());
    }

    #[test]
    fn with_file_text_leaves_the_original_alone() {
        let workspace = Workspace::from_files([("A.java", "class A { void m() {} }")]);
        let file = FileId::new("A.java");
        let edited = workspace.with_file_text(&file, "class A { void m() { n(); } }");
        assert!(workspace.diagnostics(&file).is_empty());
        let codes: Vec<_> = edited.diagnostics(&file).iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["unresolved-method"]);
    }
}
