//! Classifying the occurrences of the method family in one file and
//! rewriting each of them.

use std::collections::{HashMap, HashSet};

use jolt_core::{FileId, TextEdit, TextRange};
use jolt_index::{keys_match, AnnotatedUnit, MethodInfo, Scope, TypeResolution};
use jolt_syntax::ast::{
    ArgList, ClassBody, ConstructorCallExpr, ConstructorCallKind, DocMethodRef, EnumConstant, Expr,
    MethodCallExpr, MethodDecl, NewExpr, NodeId, TypeDecl, Visibility,
};
use jolt_syntax::visit::{self, Visitor};
use tokio_util::sync::CancellationToken;

use super::model::ParameterInfo;
use super::ripple;
use super::state::SignatureState;
use super::ChangeSignatureOptions;
use crate::imports::ImportRewrite;
use crate::rewrite::{ListShape, Piece, Slot, SourceRewrite};
use crate::semantic::RefactorDatabase;
use crate::status::{Problem, RefactoringStatus, StatusContext};

/// Everything a rewrite needs to know about the method being changed.
#[derive(Clone, Copy)]
pub(super) struct Target<'a> {
    pub db: &'a dyn RefactorDatabase,
    pub state: &'a SignatureState,
    pub method: &'a MethodInfo,
    pub options: ChangeSignatureOptions,
}

#[derive(Debug, Clone, Copy)]
pub(super) enum CallKind<'a> {
    Method(&'a MethodCallExpr),
    New(&'a NewExpr),
    Constructor(&'a ConstructorCallExpr),
    EnumConstant(&'a EnumConstant),
}

impl CallKind<'_> {
    fn id(&self) -> NodeId {
        match self {
            CallKind::Method(call) => call.id,
            CallKind::New(new) => new.id,
            CallKind::Constructor(call) => call.id,
            CallKind::EnumConstant(constant) => constant.id,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct CallSite<'a> {
    pub kind: CallKind<'a>,
    /// Innermost method or constructor whose body contains the call.
    pub enclosing: Option<&'a MethodDecl>,
}

#[derive(Debug, Clone, Copy)]
pub(super) enum Occurrence<'a> {
    Reference(CallSite<'a>),
    Declaration(&'a MethodDecl),
    DocReference(&'a DocMethodRef),
    /// A node bound to the method that cannot be rewritten, such as a method
    /// reference.
    Unrecognized { range: TextRange },
}

struct Collector<'a, 's> {
    wanted: &'s HashSet<NodeId>,
    /// `None` marks a class body entered outside of any method.
    enclosing: Vec<Option<&'a MethodDecl>>,
    found: Vec<Occurrence<'a>>,
    names: HashMap<NodeId, TextRange>,
}

impl<'a> Collector<'a, '_> {
    fn reference(&mut self, kind: CallKind<'a>) {
        self.found.push(Occurrence::Reference(CallSite {
            kind,
            enclosing: self.enclosing.last().copied().flatten(),
        }));
    }
}

impl<'a> Visitor<'a> for Collector<'a, '_> {
    fn visit_class_body(&mut self, body: &'a ClassBody) {
        self.enclosing.push(None);
        visit::walk_class_body(self, body);
        self.enclosing.pop();
    }

    fn visit_method(&mut self, method: &'a MethodDecl) {
        if self.wanted.contains(&method.id) {
            self.found.push(Occurrence::Declaration(method));
        }
        self.enclosing.push(Some(method));
        visit::walk_method(self, method);
        self.enclosing.pop();
    }

    fn visit_enum_constant(&mut self, constant: &'a EnumConstant) {
        if self.wanted.contains(&constant.id) {
            self.reference(CallKind::EnumConstant(constant));
        }
        visit::walk_enum_constant(self, constant);
    }

    fn visit_doc_method_ref(&mut self, method_ref: &'a DocMethodRef) {
        if self.wanted.contains(&method_ref.id) {
            self.found.push(Occurrence::DocReference(method_ref));
        }
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Name(name) => {
                self.names.insert(name.id, name.range);
            }
            Expr::MethodCall(call) if self.wanted.contains(&call.id) => {
                self.reference(CallKind::Method(call))
            }
            Expr::New(new) if self.wanted.contains(&new.id) => self.reference(CallKind::New(new)),
            Expr::ConstructorCall(call) if self.wanted.contains(&call.id) => {
                self.reference(CallKind::Constructor(call))
            }
            Expr::MethodRef(method_ref) if self.wanted.contains(&method_ref.id) => {
                self.found.push(Occurrence::Unrecognized {
                    range: method_ref.range,
                });
            }
            _ => {}
        }
        visit::walk_expr(self, expr);
    }
}

/// The new parameter list as slots over an old list of `element_count`
/// elements. Added parameters are rendered by `fresh`; existing ones the old
/// list does not have are left out.
fn reshuffle(
    state: &SignatureState,
    element_count: usize,
    mut fresh: impl FnMut(&ParameterInfo) -> String,
) -> Vec<Slot> {
    state
        .new_parameters()
        .filter_map(|info| match info.old_index() {
            None => Some(Slot::New(fresh(info))),
            Some(old) if old < element_count => Some(Slot::Existing(old)),
            Some(_) => None,
        })
        .collect()
}

/// Whether a family member currently declared with `current` visibility must
/// be rewritten when the target goes from `initial` to `requested`. Members
/// that are already at least as visible (when widening) or already at most
/// as visible (when narrowing) are left alone.
pub(super) fn needs_visibility_update(
    initial: Visibility,
    requested: Visibility,
    current: Visibility,
) -> bool {
    if initial == requested {
        return false;
    }
    if requested > initial {
        requested > current
    } else {
        current > requested
    }
}

/// `List<String>[]` as `List[]`; doc references name erased types.
fn erase_type_arguments(ty: &str) -> String {
    let mut depth = 0usize;
    ty.chars()
        .filter(|&c| match c {
            '<' => {
                depth += 1;
                false
            }
            '>' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

/// Offset of the first non-whitespace character at or after `offset`.
fn skip_whitespace(text: &str, offset: usize) -> usize {
    let rest = text.get(offset..).unwrap_or("");
    offset + (rest.len() - rest.trim_start().len())
}

/// Pending edits for one compilation unit.
pub(super) struct UnitRewriter<'a> {
    target: Target<'a>,
    unit: &'a AnnotatedUnit,
    names: HashMap<NodeId, TextRange>,
    rewrite: SourceRewrite,
    imports: ImportRewrite,
    status: RefactoringStatus,
}

impl<'a> UnitRewriter<'a> {
    pub fn new(target: Target<'a>, unit: &'a AnnotatedUnit) -> Self {
        Self {
            target,
            unit,
            names: HashMap::new(),
            rewrite: SourceRewrite::new(unit.file.clone(), unit.text.clone()),
            imports: ImportRewrite::new(unit.unit(), target.options.add_imports),
            status: RefactoringStatus::new(),
        }
    }

    fn file(&self) -> &FileId {
        &self.unit.file
    }

    fn context(&self, range: TextRange) -> Option<StatusContext> {
        Some(StatusContext::new(self.file().clone(), range))
    }

    /// Rewrite every node in `nodes`, declarations first. Returns `false` when
    /// `cancel` fired before all of them were done.
    pub fn rewrite_occurrences(
        &mut self,
        nodes: &HashSet<NodeId>,
        cancel: &CancellationToken,
    ) -> bool {
        let unit = self.unit;
        let mut collector = Collector {
            wanted: nodes,
            enclosing: Vec::new(),
            found: Vec::new(),
            names: HashMap::new(),
        };
        visit::walk_compilation_unit(&mut collector, unit.unit());
        self.names = collector.names;

        let (declarations, others): (Vec<_>, Vec<_>) = collector
            .found
            .into_iter()
            .partition(|occurrence| matches!(occurrence, Occurrence::Declaration(_)));
        tracing::trace!(
            target: "jolt.refactor",
            file = %unit.file,
            declarations = declarations.len(),
            references = others.len(),
            "rewriting occurrences"
        );

        for occurrence in declarations.into_iter().chain(others) {
            if cancel.is_cancelled() {
                return false;
            }
            match occurrence {
                Occurrence::Declaration(decl) => self.update_declaration(decl),
                Occurrence::Reference(site) => self.update_reference(&site),
                Occurrence::DocReference(method_ref) => {
                    if self.target.options.update_doc_references {
                        self.update_doc_reference(method_ref);
                    }
                }
                Occurrence::Unrecognized { range } => self.report_unrecognized(range),
            }
        }
        true
    }

    /// Make the subclass `decl` pass `arguments` to its super constructor.
    pub fn ripple_subclass(&mut self, decl: &TypeDecl, access: Visibility, arguments: &str) {
        ripple::add_super_calls(&mut self.rewrite, &self.unit.text, decl, access, arguments);
    }

    /// Parameter edits, import edits and the problems found on the way.
    pub fn finish(self) -> (Vec<TextEdit>, Vec<TextEdit>, RefactoringStatus) {
        let file = self.unit.file.clone();
        (self.rewrite.edits(), self.imports.edits(&file), self.status)
    }

    fn report_unrecognized(&mut self, range: TextRange) {
        let position = self.unit.line_col(range.start);
        let text = self.unit.slice(range).to_string();
        tracing::warn!(
            target: "jolt.refactor",
            file = %self.unit.file,
            %position,
            %text,
            "cannot update occurrence"
        );
        self.status.add_error(
            Problem::UnrecognizedOccurrence {
                position: position.to_string(),
                text,
            },
            self.context(range),
        );
    }

    fn is_recursive(&self, site: &CallSite<'_>, callee: &MethodInfo) -> bool {
        let Some(enclosing) = site.enclosing else {
            return false;
        };
        let db = self.target.db;
        let model = db.model();
        let Some(enclosing) = model.method_by_node(self.file(), enclosing.id) else {
            return false;
        };
        match site.kind {
            CallKind::Constructor(call) if call.kind == ConstructorCallKind::Super => false,
            CallKind::Method(call) if call.is_super_call() => {
                let enclosing = model.method(enclosing);
                enclosing.name == callee.name
                    && keys_match(&enclosing.param_keys, &callee.param_keys)
            }
            _ => enclosing == callee.id,
        }
    }

    fn update_reference(&mut self, site: &CallSite<'_>) {
        let db = self.target.db;
        let model = db.model();
        let Some(callee) = self.unit.bindings.method(site.kind.id()) else {
            return;
        };
        let callee = model.method(callee);
        let recursive = self.is_recursive(site, callee);
        let state = self.target.state;

        match site.kind {
            CallKind::Method(call) => {
                if state.is_name_changed() {
                    self.rewrite.replace(call.name.id, call.name.range, state.new_name());
                }
                self.rewrite_arguments(&call.args, callee, recursive);
            }
            CallKind::New(new) => self.rewrite_arguments(&new.args, callee, recursive),
            CallKind::Constructor(call) => self.rewrite_arguments(&call.args, callee, recursive),
            CallKind::EnumConstant(constant) => match &constant.args {
                Some(args) => self.rewrite_arguments(args, callee, recursive),
                None => {
                    let slots = reshuffle(state, 0, |info| info.default_value().to_string());
                    let values: Vec<String> = slots
                        .into_iter()
                        .filter_map(|slot| match slot {
                            Slot::New(value) => Some(value),
                            Slot::Existing(_) => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        self.rewrite
                            .insert(constant.name.range.end, format!("({})", values.join(", ")));
                    }
                }
            },
        }
    }

    /// In a recursive call an added parameter is passed on by name; elsewhere
    /// it gets its default value.
    fn rewrite_arguments(&mut self, args: &ArgList, callee: &MethodInfo, recursive: bool) {
        let list = ListShape::arguments(args, callee.arity(), callee.varargs);
        let slots = reshuffle(self.target.state, list.elements.len(), |info| {
            if recursive {
                info.new_name().to_string()
            } else {
                info.default_value().to_string()
            }
        });
        self.rewrite.rewrite_list(&list, &slots);
    }

    fn update_declaration(&mut self, decl: &MethodDecl) {
        let db = self.target.db;
        let model = db.model();
        let Some(id) = model.method_by_node(self.file(), decl.id) else {
            return;
        };
        let member = model.method(id);
        let state = self.target.state;

        self.update_parameters(decl);
        if !decl.is_constructor() {
            if state.is_name_changed() {
                self.rewrite.replace(decl.name.id, decl.name.range, state.new_name());
            }
            if state.is_return_type_changed() {
                if let (Some(ty), Some(new_type)) = (&decl.return_ty, state.new_return_type()) {
                    let text = self.imports.add(new_type);
                    self.rewrite.replace(ty.id, ty.range, text);
                }
            }
        }
        self.update_visibility(decl, member);

        let list = ListShape::parameters(&decl.params);
        let imports = &mut self.imports;
        let slots = reshuffle(state, list.elements.len(), |info| {
            format!("{} {}", imports.add(info.new_type()), info.new_name())
        });
        self.rewrite.rewrite_list(&list, &slots);

        self.update_exceptions(decl, member);
        self.check_deleted_parameters(decl, member);
    }

    /// Renames (with every use in the body) and type changes of kept
    /// parameters. A family member whose parameter has another name keeps it.
    fn update_parameters(&mut self, decl: &MethodDecl) {
        let state = self.target.state;
        let unit = self.unit;
        for info in state.new_parameters() {
            let Some(param) = info.old_index().and_then(|old| decl.params.params.get(old)) else {
                continue;
            };
            if info.is_renamed() && param.name.text == info.old_name() {
                self.rewrite.replace(param.name.id, param.name.range, info.new_name());
                for reference in unit.bindings.references_to(param.name.id) {
                    if let Some(range) = self.names.get(&reference).copied() {
                        self.rewrite.replace(reference, range, info.new_name());
                    }
                }
            }
            if info.is_type_changed() {
                let ty = self.imports.add(info.new_type());
                if param.varargs {
                    let range = TextRange::new(param.ty.range.start, param.name.range.start);
                    self.rewrite.replace(param.ty.id, range, format!("{ty} "));
                } else {
                    self.rewrite.replace(param.ty.id, param.ty.range, ty);
                }
                if let Some(dims) = param.extra_dims {
                    self.rewrite.remove(dims);
                }
            }
        }
    }

    fn update_visibility(&mut self, decl: &MethodDecl, member: &MethodInfo) {
        let db = self.target.db;
        let model = db.model();
        let state = self.target.state;
        if model.type_info(member.declaring_type).is_interface() {
            return;
        }
        let requested = state.new_visibility();
        if !needs_visibility_update(state.old_visibility(), requested, member.visibility) {
            return;
        }
        match (decl.modifiers.visibility_keyword(), state.new_visibility().keyword()) {
            (Some(existing), Some(keyword)) => {
                self.rewrite
                    .replace_range(existing.range, vec![Piece::Text(keyword.to_string())]);
            }
            (Some(existing), None) => {
                let end = skip_whitespace(&self.unit.text, existing.range.end);
                self.rewrite.remove(TextRange::new(existing.range.start, end));
            }
            (None, Some(keyword)) => self
                .rewrite
                .insert(decl.modifier_insertion_offset(), format!("{keyword} ")),
            (None, None) => {}
        }
    }

    fn update_exceptions(&mut self, decl: &MethodDecl, member: &MethodInfo) {
        let state = self.target.state;
        if !state.are_exceptions_changed() {
            return;
        }
        let db = self.target.db;
        let model = db.model();
        let scope = Scope::new(self.file(), Some(member.declaring_type))
            .with_type_vars(&member.type_params);
        let deleted: Vec<&str> = state
            .exceptions()
            .iter()
            .filter(|info| info.is_deleted())
            .map(|info| info.qualified_name())
            .collect();

        let mut pieces = Vec::new();
        let mut present = Vec::new();
        for ty in decl.throws.iter().flat_map(|throws| &throws.types) {
            if let TypeResolution::One(id) = model.resolve_type(scope, &ty.text) {
                let qualified = model.type_info(id).qualified_name.as_str();
                if deleted.contains(&qualified) {
                    continue;
                }
                present.push(qualified);
            }
            if !pieces.is_empty() {
                pieces.push(Piece::Text(", ".to_string()));
            }
            pieces.push(Piece::Copy(ty.range));
        }
        for info in state.exceptions().iter().filter(|info| info.is_added()) {
            if present.contains(&info.qualified_name()) {
                continue;
            }
            if !pieces.is_empty() {
                pieces.push(Piece::Text(", ".to_string()));
            }
            pieces.push(Piece::Text(self.imports.add(info.qualified_name())));
        }

        let params_end = decl.params.range.end;
        match &decl.throws {
            Some(throws) if pieces.is_empty() => {
                self.rewrite.remove(TextRange::new(params_end, throws.range.end))
            }
            Some(throws) => {
                let start = throws.types.first().map_or(throws.range.end, |ty| ty.range.start);
                self.rewrite
                    .replace_range(TextRange::new(start, throws.range.end), pieces);
            }
            None if pieces.is_empty() => {}
            None => {
                pieces.insert(0, Piece::Text(" throws ".to_string()));
                self.rewrite.replace_range(TextRange::empty(params_end), pieces);
            }
        }
    }

    fn check_deleted_parameters(&mut self, decl: &MethodDecl, member: &MethodInfo) {
        let db = self.target.db;
        let model = db.model();
        let state = self.target.state;
        for info in state.parameters().iter().filter(|info| info.is_deleted()) {
            let Some(param) = info.old_index().and_then(|old| decl.params.params.get(old)) else {
                continue;
            };
            let mut uses: Vec<TextRange> = self
                .unit
                .bindings
                .references_to(param.name.id)
                .filter_map(|reference| self.names.get(&reference).copied())
                .collect();
            uses.sort_by_key(|range| range.start);
            for range in uses {
                self.status.add_error(
                    Problem::DeletedParameterStillUsed {
                        name: param.name.text.clone(),
                        method: decl.name.text.clone(),
                        declaring: model.type_name(member.declaring_type),
                    },
                    self.context(range),
                );
            }
        }
    }

    fn update_doc_reference(&mut self, method_ref: &DocMethodRef) {
        let state = self.target.state;
        if let Some(params) = &method_ref.params {
            for info in state.new_parameters() {
                let Some(param) = info.old_index().and_then(|old| params.params.get(old)) else {
                    continue;
                };
                if info.is_renamed() {
                    if let Some(name) = &param.name {
                        self.rewrite.replace(name.id, name.range, info.new_name());
                    }
                }
                if info.is_type_changed() {
                    let ty = self.imports.add(&erase_type_arguments(info.new_type()));
                    self.rewrite.replace(param.ty.id, param.ty.range, ty);
                }
            }
        }

        if state.is_name_changed() {
            self.rewrite
                .replace(method_ref.name.id, method_ref.name.range, state.new_name());
        }

        if let Some(params) = &method_ref.params {
            let named = params.params.first().is_some_and(|param| param.name.is_some());
            let list = ListShape::doc_parameters(params);
            let imports = &mut self.imports;
            let slots = reshuffle(state, list.elements.len(), |info| {
                let ty = imports.add(&erase_type_arguments(info.new_type()));
                if named {
                    format!("{ty} {}", info.new_name())
                } else {
                    ty
                }
            });
            self.rewrite.rewrite_list(&list, &slots);
        }
    }
}
