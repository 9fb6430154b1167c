//! Binds names, calls and type references of one source file to the model and
//! reports the semantic errors a compiler would.
//!
//! Typing is deliberately shallow: generics are erased to `Unknown`, and an
//! unknown argument type is compatible with every parameter. That is enough to
//! pick overloads by arity and by the obvious literal/declared types.

use std::collections::HashMap;

use jolt_core::{FileId, TextRange};
use jolt_syntax::ast::*;
use jolt_syntax::Diagnostic;

use crate::model::{MethodId, MethodInfo, Model, TypeId};
use crate::resolve::{Scope, TypeResolution};

/// Resolved references of one compilation unit, keyed by syntax node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileBindings {
    methods: HashMap<NodeId, MethodId>,
    types: HashMap<NodeId, TypeId>,
    locals: HashMap<NodeId, NodeId>,
}

impl FileBindings {
    /// Target of a call, `new`, `this(..)`/`super(..)`, enum constant, method
    /// reference or doc reference; for a `MethodDecl` the declared method.
    pub fn method(&self, node: NodeId) -> Option<MethodId> {
        self.methods.get(&node).copied()
    }

    pub fn type_ref(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    /// Declaration (`Name` node of a parameter, local or pattern binding) a
    /// `NameExpr` refers to.
    pub fn local(&self, name_expr: NodeId) -> Option<NodeId> {
        self.locals.get(&name_expr).copied()
    }

    /// Every `NameExpr` bound to the declaration `decl`, in no particular order.
    pub fn references_to(&self, decl: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.locals
            .iter()
            .filter(move |(_, &target)| target == decl)
            .map(|(&node, _)| node)
    }

    /// Nodes bound to one of `targets`.
    pub fn nodes_bound_to<'a>(
        &'a self,
        targets: &'a [MethodId],
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.methods
            .iter()
            .filter(move |(_, method)| targets.contains(method))
            .map(|(&node, _)| node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Ty {
    Prim(&'static str),
    Ref(TypeId),
    Array(Box<Ty>),
    /// A type name in expression position, `Math.max`.
    Static(TypeId),
    /// Leading segments of a qualified name, `java.util`.
    Package(String),
    Null,
    Void,
    Unknown,
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

fn primitive(name: &str) -> Option<&'static str> {
    PRIMITIVES.iter().copied().find(|prim| *prim == name)
}

fn numeric_rank(prim: &str) -> Option<u8> {
    Some(match prim {
        "byte" => 1,
        "short" | "char" => 2,
        "int" => 3,
        "long" => 4,
        "float" => 5,
        "double" => 6,
        _ => return None,
    })
}

fn widens(from: &str, to: &str) -> bool {
    match (from, numeric_rank(from), numeric_rank(to)) {
        ("char", _, Some(to_rank)) => to_rank >= 3,
        (_, Some(_), _) if to == "char" => false,
        (_, Some(from_rank), Some(to_rank)) => from_rank < to_rank,
        _ => false,
    }
}

fn boxed(prim: &str) -> &'static str {
    match prim {
        "boolean" => "java.lang.Boolean",
        "byte" => "java.lang.Byte",
        "char" => "java.lang.Character",
        "short" => "java.lang.Short",
        "int" => "java.lang.Integer",
        "long" => "java.lang.Long",
        "float" => "java.lang.Float",
        _ => "java.lang.Double",
    }
}

fn promote(lhs: &Ty, rhs: &Ty) -> Ty {
    match (lhs, rhs) {
        (Ty::Prim(a), Ty::Prim(b)) => match (numeric_rank(a), numeric_rank(b)) {
            (Some(x), Some(y)) if x.max(y) <= 3 => Ty::Prim("int"),
            (Some(x), Some(y)) => Ty::Prim(if x >= y { *a } else { *b }),
            _ => Ty::Unknown,
        },
        _ => Ty::Unknown,
    }
}

/// Simple name plus array suffix, the way doc references spell types.
fn doc_type_key(text: &str) -> String {
    let base = base_type_name(text);
    let mut key = base.rsplit('.').next().unwrap_or(base).to_string();
    let dims = text.matches("[]").count() + usize::from(text.ends_with("..."));
    for _ in 0..dims {
        key.push_str("[]");
    }
    key
}

#[derive(Debug, Clone)]
struct Local {
    name: String,
    decl: NodeId,
    ty: Ty,
}

pub(crate) fn bind_file(
    model: &Model,
    file: &FileId,
    unit: &CompilationUnit,
) -> (FileBindings, Vec<Diagnostic>) {
    let static_imports = model
        .file_scope(file)
        .is_some_and(|scope| scope.has_static_imports());
    let mut binder = Binder {
        model,
        file,
        static_imports,
        bindings: FileBindings::default(),
        diagnostics: Vec::new(),
        types: Vec::new(),
        type_vars: Vec::new(),
        scopes: Vec::new(),
        in_case_label: false,
    };
    for decl in &unit.types {
        binder.type_decl(decl);
    }
    (binder.bindings, binder.diagnostics)
}

struct Binder<'m> {
    model: &'m Model,
    file: &'m FileId,
    static_imports: bool,
    bindings: FileBindings,
    diagnostics: Vec<Diagnostic>,
    types: Vec<TypeId>,
    type_vars: Vec<String>,
    scopes: Vec<Vec<Local>>,
    in_case_label: bool,
}

impl Binder<'_> {
    fn scope(&self) -> Scope<'_> {
        Scope::new(self.file, self.types.last().copied()).with_type_vars(&self.type_vars)
    }

    fn current_type(&self) -> Option<TypeId> {
        self.types.last().copied()
    }

    fn error(&mut self, code: &'static str, message: String, range: TextRange) {
        self.diagnostics.push(Diagnostic::error(code, message, Some(range)));
    }

    // ---- declarations -------------------------------------------------

    fn type_decl(&mut self, decl: &TypeDecl) {
        let Some(id) = self.model.type_by_node(self.file, decl.id) else {
            return;
        };
        self.types.push(id);
        for ty in decl.extends.iter().chain(&decl.implements) {
            self.type_ref(ty);
        }
        self.doc(decl.doc.as_ref());
        self.class_body(&decl.body);
        self.types.pop();
    }

    fn class_body(&mut self, body: &ClassBody) {
        self.check_duplicate_methods(body);
        for member in &body.members {
            match member {
                Member::Field(field) => {
                    self.doc(field.doc.as_ref());
                    self.type_ref(&field.ty);
                    for var in &field.vars {
                        if let Some(init) = &var.init {
                            self.expr(init);
                        }
                    }
                }
                Member::Method(method) => self.method(method),
                Member::Initializer(init) => self.block(&init.body),
                Member::Type(decl) => self.type_decl(decl),
                Member::EnumConstant(constant) => self.enum_constant(constant),
            }
        }
    }

    fn check_duplicate_methods(&mut self, body: &ClassBody) {
        let mut seen: Vec<MethodId> = Vec::new();
        for method in body.methods() {
            let Some(id) = self.model.method_by_node(self.file, method.id) else {
                continue;
            };
            let info = self.model.method(id);
            let duplicate = seen.iter().any(|&other| {
                let other = self.model.method(other);
                other.name == info.name && other.param_keys == info.param_keys
            });
            if duplicate {
                let owner = self.model.type_name(info.declaring_type);
                self.error(
                    "duplicate-method",
                    format!(
                        "method `{}({})` is already defined in `{owner}`",
                        info.name,
                        info.param_types.join(", ")
                    ),
                    method.name.range,
                );
            } else {
                seen.push(id);
            }
        }
    }

    fn method(&mut self, method: &MethodDecl) {
        let saved_vars = self.type_vars.len();
        self.type_vars.extend(method.type_params.iter().cloned());
        if let Some(id) = self.model.method_by_node(self.file, method.id) {
            self.bindings.methods.insert(method.id, id);
        }
        self.doc(method.doc.as_ref());
        if let Some(ty) = &method.return_ty {
            self.type_ref(ty);
        }

        let mut names: Vec<&str> = Vec::new();
        for param in &method.params.params {
            self.type_ref(&param.ty);
            if names.contains(&param.name.text.as_str()) {
                self.error(
                    "duplicate-parameter",
                    format!(
                        "variable `{}` is already defined in method `{}`",
                        param.name.text, method.name.text
                    ),
                    param.name.range,
                );
            }
            names.push(&param.name.text);
        }
        if let Some(throws) = &method.throws {
            for ty in &throws.types {
                self.type_ref(ty);
            }
        }

        if let Some(body) = &method.body {
            self.scopes.push(Vec::new());
            for param in &method.params.params {
                let ty = self.ty_from_text(&param.type_text());
                self.declare(&param.name, ty);
            }
            for stmt in &body.stmts {
                self.stmt(stmt);
            }
            self.scopes.pop();
        }
        self.type_vars.truncate(saved_vars);
    }

    fn enum_constant(&mut self, constant: &EnumConstant) {
        let args = constant
            .args
            .as_ref()
            .map(|args| self.arg_types(args))
            .unwrap_or_default();
        if let Some(owner) = self.current_type() {
            self.bind_constructor(constant.id, owner, &args, constant.name.range);
        }
        if let Some(body) = &constant.body {
            if let Some(anonymous) = self.model.type_by_node(self.file, constant.id) {
                self.types.push(anonymous);
                self.class_body(body);
                self.types.pop();
            }
        }
    }

    fn doc(&mut self, doc: Option<&DocComment>) {
        let Some(doc) = doc else {
            return;
        };
        for method_ref in &doc.method_refs {
            self.doc_method_ref(method_ref);
        }
    }

    fn doc_method_ref(&mut self, method_ref: &DocMethodRef) {
        let target = match &method_ref.qualifier {
            Some(qualifier) => match self.model.resolve_type(self.scope(), &qualifier.text) {
                TypeResolution::One(id) => {
                    self.bindings.types.insert(qualifier.id, id);
                    id
                }
                _ => return,
            },
            None => match self.current_type() {
                Some(id) => id,
                None => return,
            },
        };
        let name = &method_ref.name.text;
        let candidates = if *name == self.model.type_info(target).name {
            self.model.constructors(target)
        } else {
            self.member_methods(target, name)
        };
        let chosen = match &method_ref.params {
            None => candidates.first().copied(),
            Some(list) => {
                let by_arity: Vec<MethodId> = candidates
                    .iter()
                    .copied()
                    .filter(|&id| self.model.method(id).arity() == list.params.len())
                    .collect();
                by_arity
                    .iter()
                    .copied()
                    .find(|&id| {
                        let info = self.model.method(id);
                        info.param_types
                            .iter()
                            .zip(&list.params)
                            .all(|(declared, written)| {
                                doc_type_key(declared) == doc_type_key(&written.ty.text)
                            })
                    })
                    .or_else(|| by_arity.first().copied())
            }
        };
        if let Some(id) = chosen {
            self.bindings.methods.insert(method_ref.id, id);
        }
    }

    // ---- types --------------------------------------------------------

    fn type_ref(&mut self, ty: &TypeRef) -> Ty {
        if ty.text == "var" {
            return Ty::Unknown;
        }
        match self.model.resolve_type(self.scope(), &ty.text) {
            TypeResolution::One(id) => {
                self.bindings.types.insert(ty.id, id);
            }
            TypeResolution::NotFound => self.error(
                "unresolved-type",
                format!("cannot find type `{}`", ty.base_name()),
                ty.range,
            ),
            TypeResolution::Many(_) => self.error(
                "unresolved-type",
                format!("reference to `{}` is ambiguous", ty.base_name()),
                ty.range,
            ),
            TypeResolution::TypeVar | TypeResolution::Primitive => {}
        }
        self.ty_from_text(&ty.text)
    }

    fn ty_from_text(&self, text: &str) -> Ty {
        self.ty_in(self.scope(), text)
    }

    fn ty_in(&self, scope: Scope<'_>, text: &str) -> Ty {
        let base = base_type_name(text);
        let mut ty = if base == "void" {
            Ty::Void
        } else if let Some(prim) = primitive(base) {
            Ty::Prim(prim)
        } else {
            match self.model.resolve_type(scope, text) {
                TypeResolution::One(id) => Ty::Ref(id),
                _ => Ty::Unknown,
            }
        };
        let dims = text.matches("[]").count() + usize::from(text.ends_with("..."));
        for _ in 0..dims {
            ty = Ty::Array(Box::new(ty));
        }
        ty
    }

    /// Type of a member declared in `owner`, written as `text`.
    fn member_ty(&self, owner: TypeId, type_vars: &[String], text: &str) -> Ty {
        let scope =
            Scope::new(&self.model.type_info(owner).file, Some(owner)).with_type_vars(type_vars);
        self.ty_in(scope, text)
    }

    fn param_ty(&self, method: &MethodInfo, index: usize) -> Ty {
        match method.param_types.get(index) {
            Some(text) => self.member_ty(method.declaring_type, &method.type_params, text),
            None => Ty::Unknown,
        }
    }

    fn return_ty(&self, method: &MethodInfo) -> Ty {
        match &method.return_type {
            Some(text) => self.member_ty(method.declaring_type, &method.type_params, text),
            None => Ty::Ref(method.declaring_type),
        }
    }

    fn named(&self, qualified: &str) -> Option<TypeId> {
        self.model.type_by_qualified_name(qualified)
    }

    // ---- scopes -------------------------------------------------------

    fn declare(&mut self, name: &Name, ty: Ty) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(Local {
                name: name.text.clone(),
                decl: name.id,
                ty,
            });
        }
    }

    fn lookup_local(&self, name: &str) -> Option<&Local> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|local| local.name == name)
    }

    fn field_in_scope(&self, name: &str) -> Option<Ty> {
        let current = self.current_type()?;
        self.model.enclosing_chain(current).into_iter().find_map(|ty| {
            let (owner, field) = self.model.find_field(ty, name)?;
            Some(self.member_ty(owner, &[], &field.ty))
        })
    }

    fn statically_imported(&self, name: &str) -> bool {
        self.model.file_scope(self.file).is_some_and(|scope| {
            scope
                .imports
                .iter()
                .any(|import| {
                    import.is_static && (import.is_star || import.simple_name() == Some(name))
                })
        })
    }

    /// Lookups from the current position see every member that exists.
    fn lookups_are_exhaustive(&self) -> bool {
        !self.static_imports
            && self.current_type().is_some_and(|current| {
                self.model
                    .enclosing_chain(current)
                    .into_iter()
                    .all(|ty| self.model.hierarchy_is_known(ty))
            })
    }

    fn member_methods(&self, ty: TypeId, name: &str) -> Vec<MethodId> {
        let methods = self.model.member_methods(ty, name);
        if !methods.is_empty() || !self.model.type_info(ty).is_interface() {
            return methods;
        }
        match self.model.object_type() {
            Some(object) => self.model.member_methods(object, name),
            None => methods,
        }
    }

    // ---- statements ---------------------------------------------------

    fn block(&mut self, block: &Block) {
        self.scopes.push(Vec::new());
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.scopes.pop();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::LocalVar(local) => self.local_var(local),
            Stmt::LocalType(decl) => self.type_decl(decl),
            Stmt::Expr(stmt) => {
                self.expr(&stmt.expr);
            }
            Stmt::Return(stmt) => {
                if let Some(expr) = &stmt.expr {
                    self.expr(expr);
                }
            }
            Stmt::Throw(stmt) => {
                self.expr(&stmt.expr);
            }
            Stmt::If(stmt) => {
                self.expr(&stmt.cond);
                self.stmt(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.stmt(else_branch);
                }
            }
            Stmt::While(stmt) => {
                self.expr(&stmt.cond);
                self.stmt(&stmt.body);
            }
            Stmt::Do(stmt) => {
                self.stmt(&stmt.body);
                self.expr(&stmt.cond);
            }
            Stmt::For(stmt) => {
                self.scopes.push(Vec::new());
                for init in &stmt.init {
                    self.stmt(init);
                }
                if let Some(cond) = &stmt.cond {
                    self.expr(cond);
                }
                for update in &stmt.update {
                    self.expr(update);
                }
                self.stmt(&stmt.body);
                self.scopes.pop();
            }
            Stmt::ForEach(stmt) => {
                self.scopes.push(Vec::new());
                let iterable = self.expr(&stmt.iterable);
                let declared = self.type_ref(&stmt.ty);
                let ty = match (declared, iterable) {
                    (Ty::Unknown, Ty::Array(element)) => *element,
                    (declared, _) => declared,
                };
                self.declare(&stmt.name, ty);
                self.stmt(&stmt.body);
                self.scopes.pop();
            }
            Stmt::Try(stmt) => {
                self.scopes.push(Vec::new());
                for resource in &stmt.resources {
                    self.stmt(resource);
                }
                self.block(&stmt.body);
                self.scopes.pop();
                for catch in &stmt.catches {
                    self.scopes.push(Vec::new());
                    let mut caught = Ty::Unknown;
                    for ty in &catch.types {
                        caught = self.type_ref(ty);
                    }
                    if catch.types.len() != 1 {
                        caught = Ty::Unknown;
                    }
                    self.declare(&catch.name, caught);
                    self.block(&catch.body);
                    self.scopes.pop();
                }
                if let Some(finally) = &stmt.finally {
                    self.block(finally);
                }
            }
            Stmt::Switch(block) => self.switch_block(block),
            Stmt::Sync(stmt) => {
                self.expr(&stmt.lock);
                self.block(&stmt.body);
            }
            Stmt::Labeled(stmt) => self.stmt(&stmt.stmt),
            Stmt::Assert(stmt) => {
                self.expr(&stmt.cond);
                if let Some(message) = &stmt.message {
                    self.expr(message);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Jump(_) | Stmt::Empty(_) => {}
        }
    }

    fn local_var(&mut self, local: &LocalVarStmt) {
        let declared = self.type_ref(&local.ty);
        for var in &local.vars {
            let init = var.init.as_ref().map(|init| self.expr(init));
            let ty = match (&declared, init) {
                (Ty::Unknown, Some(init)) if local.ty.text == "var" => init,
                _ => declared.clone(),
            };
            self.declare(&var.name, ty);
        }
    }

    fn switch_block(&mut self, block: &SwitchBlock) {
        self.expr(&block.selector);
        // Old style `case` groups share one scope.
        self.scopes.push(Vec::new());
        for case in &block.cases {
            self.in_case_label = true;
            for label in &case.labels {
                self.expr(label);
            }
            self.in_case_label = false;
            for stmt in &case.body {
                self.stmt(stmt);
            }
        }
        self.scopes.pop();
    }

    // ---- expressions --------------------------------------------------

    fn expr(&mut self, expr: &Expr) -> Ty {
        self.expr_in(expr, false)
    }

    fn expr_in(&mut self, expr: &Expr, receiver: bool) -> Ty {
        match expr {
            Expr::Name(name) => self.name(name, receiver),
            Expr::Literal(literal) => match literal.kind {
                LiteralKind::Int => Ty::Prim("int"),
                LiteralKind::Long => Ty::Prim("long"),
                LiteralKind::Float => Ty::Prim("float"),
                LiteralKind::Double => Ty::Prim("double"),
                LiteralKind::Char => Ty::Prim("char"),
                LiteralKind::Boolean => Ty::Prim("boolean"),
                LiteralKind::String | LiteralKind::TextBlock => {
                    self.named("java.lang.String").map_or(Ty::Unknown, Ty::Ref)
                }
                LiteralKind::Null => Ty::Null,
            },
            Expr::This(this) => match &this.qualifier {
                Some(qualifier) => match self.model.resolve_type(self.scope(), qualifier) {
                    TypeResolution::One(id) => Ty::Ref(id),
                    _ => Ty::Unknown,
                },
                None => self.current_type().map_or(Ty::Unknown, Ty::Ref),
            },
            Expr::Super(_) => self
                .current_type()
                .and_then(|ty| self.model.type_info(ty).super_class)
                .map_or(Ty::Unknown, Ty::Ref),
            Expr::FieldAccess(access) => self.field_access(access, receiver),
            Expr::MethodCall(call) => self.call(call),
            Expr::New(new) => self.new_expr(new),
            Expr::NewArray(new) => {
                self.type_ref(&new.ty);
                for dim in &new.dims {
                    self.expr(dim);
                }
                if let Some(init) = &new.init {
                    self.expr(init);
                }
                Ty::Unknown
            }
            Expr::ArrayInit(init) => {
                for element in &init.elements {
                    self.expr(element);
                }
                Ty::Unknown
            }
            Expr::ConstructorCall(call) => {
                self.constructor_call(call);
                Ty::Void
            }
            Expr::MethodRef(method_ref) => {
                self.method_ref(method_ref);
                Ty::Unknown
            }
            Expr::Lambda(lambda) => {
                self.scopes.push(Vec::new());
                for param in &lambda.params {
                    let ty = match &param.ty {
                        Some(ty) => self.type_ref(ty),
                        None => Ty::Unknown,
                    };
                    self.declare(&param.name, ty);
                }
                match &lambda.body {
                    LambdaBody::Expr(body) => {
                        self.expr(body);
                    }
                    LambdaBody::Block(body) => self.block(body),
                }
                self.scopes.pop();
                Ty::Unknown
            }
            Expr::Unary(unary) => {
                let operand = self.expr(&unary.operand);
                match unary.op {
                    UnaryOp::Not => Ty::Prim("boolean"),
                    UnaryOp::PreInc
                    | UnaryOp::PreDec
                    | UnaryOp::PostInc
                    | UnaryOp::PostDec => operand,
                    _ => promote(&operand, &Ty::Prim("int")),
                }
            }
            Expr::Binary(binary) => {
                let lhs = self.expr(&binary.lhs);
                let rhs = self.expr(&binary.rhs);
                let string = self
                    .named("java.lang.String")
                    .map(Ty::Ref)
                    .filter(|string| {
                        binary.op == BinaryOp::Add && (*string == lhs || *string == rhs)
                    });
                if binary.op.is_comparison() {
                    Ty::Prim("boolean")
                } else if let Some(string) = string {
                    string
                } else if matches!(binary.op, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) {
                    promote(&lhs, &Ty::Prim("int"))
                } else if matches!(lhs, Ty::Prim("boolean")) && matches!(rhs, Ty::Prim("boolean")) {
                    Ty::Prim("boolean")
                } else {
                    promote(&lhs, &rhs)
                }
            }
            Expr::Assign(assign) => {
                let lhs = self.expr(&assign.lhs);
                self.expr(&assign.rhs);
                lhs
            }
            Expr::Conditional(cond) => {
                self.expr(&cond.cond);
                let then_ty = self.expr(&cond.then_expr);
                let else_ty = self.expr(&cond.else_expr);
                match (then_ty, else_ty) {
                    (a, b) if a == b => a,
                    (Ty::Null, other) | (other, Ty::Null) => other,
                    (a, b) => promote(&a, &b),
                }
            }
            Expr::Cast(cast) => {
                self.expr(&cast.expr);
                self.type_ref(&cast.ty)
            }
            Expr::InstanceOf(instance_of) => {
                self.expr(&instance_of.expr);
                let ty = self.type_ref(&instance_of.ty);
                if let Some(binding) = &instance_of.binding {
                    self.declare(binding, ty);
                }
                Ty::Prim("boolean")
            }
            Expr::ArrayAccess(access) => {
                let array = self.expr(&access.array);
                self.expr(&access.index);
                match array {
                    Ty::Array(element) => *element,
                    _ => Ty::Unknown,
                }
            }
            Expr::Paren(paren) => self.expr(&paren.inner),
            Expr::ClassLiteral(literal) => {
                self.type_ref(&literal.ty);
                self.named("java.lang.Class").map_or(Ty::Unknown, Ty::Ref)
            }
            Expr::Switch(switch) => {
                self.switch_block(&switch.block);
                Ty::Unknown
            }
            Expr::Missing(_) => Ty::Unknown,
        }
    }

    fn name(&mut self, name: &NameExpr, receiver: bool) -> Ty {
        if let Some(local) = self.lookup_local(&name.name) {
            let (decl, ty) = (local.decl, local.ty.clone());
            self.bindings.locals.insert(name.id, decl);
            return ty;
        }
        if let Some(ty) = self.field_in_scope(&name.name) {
            return ty;
        }
        if self.statically_imported(&name.name) {
            return Ty::Unknown;
        }
        if receiver {
            return match self.model.resolve_type(self.scope(), &name.name) {
                TypeResolution::One(id) => Ty::Static(id),
                _ => Ty::Package(name.name.clone()),
            };
        }
        if !self.in_case_label && self.lookups_are_exhaustive() {
            self.error(
                "undefined-name",
                format!("cannot find symbol `{}`", name.name),
                name.range,
            );
        }
        Ty::Unknown
    }

    fn field_access(&mut self, access: &FieldAccessExpr, receiver: bool) -> Ty {
        let target = self.expr_in(&access.receiver, true);
        let name = &access.name.text;
        match target {
            Ty::Package(prefix) => {
                let qualified = format!("{prefix}.{name}");
                match self.named(&qualified) {
                    Some(id) => Ty::Static(id),
                    None if receiver => Ty::Package(qualified),
                    None => Ty::Unknown,
                }
            }
            Ty::Static(owner) | Ty::Ref(owner) => {
                if let Some((declaring, field)) = self.model.find_field(owner, name) {
                    return self.member_ty(declaring, &[], &field.ty);
                }
                if receiver {
                    if let Some(member) = self.model.member_type(owner, name) {
                        return Ty::Static(member);
                    }
                }
                Ty::Unknown
            }
            Ty::Array(_) if name == "length" => Ty::Prim("int"),
            _ => Ty::Unknown,
        }
    }

    fn arg_types(&mut self, args: &ArgList) -> Vec<Ty> {
        args.args.iter().map(|arg| self.expr(arg)).collect()
    }

    fn call(&mut self, call: &MethodCallExpr) -> Ty {
        let name = &call.name.text;
        let (candidates, exhaustive, owner) = match call.receiver.as_deref() {
            None => {
                let chain = self
                    .current_type()
                    .map(|current| self.model.enclosing_chain(current))
                    .unwrap_or_default();
                let found = chain.iter().find_map(|&ty| {
                    let methods = self.member_methods(ty, name);
                    (!methods.is_empty()).then_some((methods, ty))
                });
                match found {
                    Some((methods, ty)) => (methods, true, Some(ty)),
                    None => (Vec::new(), self.lookups_are_exhaustive(), self.current_type()),
                }
            }
            Some(Expr::Super(_)) => {
                let sup = self
                    .current_type()
                    .and_then(|ty| self.model.type_info(ty).super_class);
                match sup {
                    Some(sup) => (
                        self.member_methods(sup, name),
                        self.model.hierarchy_is_known(sup),
                        Some(sup),
                    ),
                    None => (Vec::new(), false, None),
                }
            }
            Some(receiver) => match self.expr_in(receiver, true) {
                Ty::Ref(ty) | Ty::Static(ty) => (
                    self.member_methods(ty, name),
                    self.model.hierarchy_is_known(ty),
                    Some(ty),
                ),
                Ty::Array(_) => match self.model.object_type() {
                    Some(object) => (self.model.member_methods(object, name), false, None),
                    None => (Vec::new(), false, None),
                },
                _ => (Vec::new(), false, None),
            },
        };

        let args = self.arg_types(&call.args);
        match self.select(&candidates, &args) {
            Some(method) => {
                self.bindings.methods.insert(call.id, method);
                self.check_parameter_types(method, call.name.range);
                let info = self.model.method(method);
                self.return_ty(info)
            }
            None => {
                if exhaustive {
                    let owner = owner.map(|ty| self.model.type_name(ty)).unwrap_or_default();
                    self.error(
                        "unresolved-method",
                        format!(
                            "cannot find method `{name}` taking {} argument(s) in `{owner}`",
                            args.len()
                        ),
                        call.name.range,
                    );
                }
                Ty::Unknown
            }
        }
    }

    /// The parameter types of a called source method must still resolve.
    fn check_parameter_types(&mut self, method: MethodId, range: TextRange) {
        let info = self.model.method(method);
        if !info.origin.is_source() {
            return;
        }
        let owner = &self.model.type_info(info.declaring_type);
        let scope = Scope::new(&owner.file, Some(info.declaring_type))
            .with_type_vars(&info.type_params);
        let missing = info
            .param_types
            .iter()
            .find(|text| self.model.resolve_type(scope, text) == TypeResolution::NotFound);
        if let Some(text) = missing {
            let message = format!(
                "parameter type `{}` of `{}` cannot be resolved",
                base_type_name(text),
                info.name
            );
            self.error("argument-type-not-found", message, range);
        }
    }

    fn new_expr(&mut self, new: &NewExpr) -> Ty {
        if let Some(outer) = &new.outer {
            self.expr(outer);
        }
        self.type_ref(&new.ty);
        let args = self.arg_types(&new.args);
        let created = self.bindings.type_ref(new.ty.id);

        if let Some(ty) = created {
            let interface_body = new.body.is_some() && self.model.type_info(ty).is_interface();
            if !interface_body {
                self.bind_constructor(new.id, ty, &args, new.ty.range);
            }
        }

        if let Some(body) = &new.body {
            if let Some(anonymous) = self.model.type_by_node(self.file, new.id) {
                self.types.push(anonymous);
                self.class_body(body);
                self.types.pop();
                return Ty::Ref(anonymous);
            }
        }
        created.map_or(Ty::Unknown, Ty::Ref)
    }

    fn constructor_call(&mut self, call: &ConstructorCallExpr) {
        let args = self.arg_types(&call.args);
        let Some(current) = self.current_type() else {
            return;
        };
        let target = match call.kind {
            ConstructorCallKind::This => Some(current),
            ConstructorCallKind::Super => self.model.type_info(current).super_class,
        };
        if let Some(target) = target {
            self.bind_constructor(call.id, target, &args, call.range);
        }
    }

    fn bind_constructor(&mut self, node: NodeId, ty: TypeId, args: &[Ty], range: TextRange) {
        let constructors = self.model.constructors(ty);
        if let Some(ctor) = self.select(&constructors, args) {
            self.bindings.methods.insert(node, ctor);
            self.check_parameter_types(ctor, range);
            return;
        }
        let info = self.model.type_info(ty);
        let implicit_default = constructors.is_empty() && args.is_empty();
        if !implicit_default && info.origin.is_source() && !info.is_interface() {
            let message = format!(
                "cannot find constructor of `{}` taking {} argument(s)",
                self.model.type_name(ty),
                args.len()
            );
            self.error("unresolved-method", message, range);
        }
    }

    fn method_ref(&mut self, method_ref: &MethodRefExpr) {
        let target = match self.expr_in(&method_ref.target, true) {
            Ty::Ref(ty) | Ty::Static(ty) => ty,
            _ => return,
        };
        let name = &method_ref.name.text;
        let chosen = if name == "new" {
            self.model.constructors(target).first().copied()
        } else {
            self.member_methods(target, name).first().copied()
        };
        if let Some(method) = chosen {
            self.bindings.methods.insert(method_ref.id, method);
        }
    }

    // ---- overloads ----------------------------------------------------

    /// Most specific applicable candidate; with nothing applicable, the only
    /// candidate of matching arity if there is exactly one.
    fn select(&self, candidates: &[MethodId], args: &[Ty]) -> Option<MethodId> {
        let mut best: Option<(u32, MethodId)> = None;
        for &candidate in candidates {
            let info = self.model.method(candidate);
            if !info.accepts_arity(args.len()) {
                continue;
            }
            let Some(score) = self.applicability(info, args) else {
                continue;
            };
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, candidate));
            }
        }
        if let Some((_, method)) = best {
            return Some(method);
        }
        let mut by_arity = candidates
            .iter()
            .copied()
            .filter(|&id| self.model.method(id).accepts_arity(args.len()));
        match (by_arity.next(), by_arity.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn applicability(&self, method: &MethodInfo, args: &[Ty]) -> Option<u32> {
        let arity = method.arity();
        let direct = !method.varargs || args.len() == arity;
        if direct {
            let total = args
                .iter()
                .enumerate()
                .map(|(index, arg)| self.compat(arg, &self.param_ty(method, index)))
                .sum::<Option<u32>>();
            if let Some(total) = total {
                return Some(total * 2 + 1);
            }
            if !method.varargs {
                return None;
            }
        }
        // Variable arity invocation.
        let fixed = arity.saturating_sub(1);
        let element = match self.param_ty(method, fixed) {
            Ty::Array(element) => *element,
            other => other,
        };
        let mut total = 0;
        for (index, arg) in args.iter().enumerate() {
            let param = if index < fixed {
                self.param_ty(method, index)
            } else {
                element.clone()
            };
            total += self.compat(arg, &param)?;
        }
        Some(total * 2)
    }

    fn compat(&self, arg: &Ty, param: &Ty) -> Option<u32> {
        let object = self.model.object_type();
        match (arg, param) {
            (Ty::Unknown, _) | (_, Ty::Unknown) => Some(1),
            (Ty::Static(_) | Ty::Package(_) | Ty::Void, _) => None,
            (Ty::Null, Ty::Prim(_)) => None,
            (Ty::Null, _) => Some(1),
            (Ty::Prim(a), Ty::Prim(b)) if a == b => Some(3),
            (Ty::Prim(a), Ty::Prim(b)) => widens(a, b).then_some(2),
            (Ty::Prim(a), Ty::Ref(b)) => {
                let boxed_ty = self.named(boxed(a))?;
                self.model.is_subtype(boxed_ty, *b).then_some(1)
            }
            (Ty::Ref(a), Ty::Prim(b)) => {
                let unboxed = PRIMITIVES
                    .iter()
                    .find(|prim| self.named(boxed(prim)) == Some(*a))?;
                (unboxed == b || widens(unboxed, b)).then_some(1)
            }
            (Ty::Ref(a), Ty::Ref(b)) if a == b => Some(3),
            (Ty::Ref(a), Ty::Ref(b)) => {
                (self.model.is_subtype(*a, *b) || Some(*b) == object).then_some(2)
            }
            (Ty::Array(a), Ty::Array(b)) => match (a.as_ref(), b.as_ref()) {
                (Ty::Prim(x), Ty::Prim(y)) => (x == y).then_some(3),
                (Ty::Prim(_), _) | (_, Ty::Prim(_)) => None,
                (x, y) => self.compat(x, y),
            },
            (Ty::Array(_), Ty::Ref(b)) => {
                let fits = Some(*b) == object
                    || [self.named("java.lang.Cloneable"), self.named("java.io.Serializable")]
                        .contains(&Some(*b));
                fits.then_some(1)
            }
            (Ty::Ref(_), Ty::Array(_))
            | (Ty::Prim(_), Ty::Array(_))
            | (Ty::Array(_), Ty::Prim(_)) => None,
            (_, Ty::Static(_) | Ty::Package(_) | Ty::Void | Ty::Null) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_widening() {
        assert!(widens("int", "long"));
        assert!(widens("char", "int"));
        assert!(!widens("short", "char"));
        assert!(!widens("long", "int"));
        assert!(!widens("boolean", "int"));
    }

    #[test]
    fn doc_type_keys_ignore_qualifiers_and_generics() {
        assert_eq!(doc_type_key("java.util.List<String>"), "List");
        assert_eq!(doc_type_key("String..."), "String[]");
        assert_eq!(doc_type_key("int[][]"), "int[][]");
    }
}
