//! Read-only traversal of the syntax tree.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending.

use crate::ast::*;

pub trait Visitor<'a>: Sized {
    fn visit_type_decl(&mut self, decl: &'a TypeDecl) {
        walk_type_decl(self, decl);
    }

    fn visit_class_body(&mut self, body: &'a ClassBody) {
        walk_class_body(self, body);
    }

    fn visit_method(&mut self, method: &'a MethodDecl) {
        walk_method(self, method);
    }

    fn visit_field(&mut self, field: &'a FieldDecl) {
        walk_field(self, field);
    }

    fn visit_enum_constant(&mut self, constant: &'a EnumConstant) {
        walk_enum_constant(self, constant);
    }

    fn visit_param(&mut self, param: &'a Param) {
        self.visit_type_ref(&param.ty);
    }

    fn visit_block(&mut self, block: &'a Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        walk_expr(self, expr);
    }

    fn visit_type_ref(&mut self, _ty: &'a TypeRef) {}

    fn visit_doc(&mut self, doc: &'a DocComment) {
        for method_ref in &doc.method_refs {
            self.visit_doc_method_ref(method_ref);
        }
    }

    fn visit_doc_method_ref(&mut self, _method_ref: &'a DocMethodRef) {}
}

pub fn walk_compilation_unit<'a, V: Visitor<'a>>(visitor: &mut V, unit: &'a CompilationUnit) {
    for decl in &unit.types {
        visitor.visit_type_decl(decl);
    }
}

pub fn walk_type_decl<'a, V: Visitor<'a>>(visitor: &mut V, decl: &'a TypeDecl) {
    if let Some(doc) = &decl.doc {
        visitor.visit_doc(doc);
    }
    for ty in decl.extends.iter().chain(&decl.implements) {
        visitor.visit_type_ref(ty);
    }
    visitor.visit_class_body(&decl.body);
}

pub fn walk_class_body<'a, V: Visitor<'a>>(visitor: &mut V, body: &'a ClassBody) {
    for member in &body.members {
        match member {
            Member::Field(field) => visitor.visit_field(field),
            Member::Method(method) => visitor.visit_method(method),
            Member::Initializer(init) => visitor.visit_block(&init.body),
            Member::Type(decl) => visitor.visit_type_decl(decl),
            Member::EnumConstant(constant) => visitor.visit_enum_constant(constant),
        }
    }
}

pub fn walk_method<'a, V: Visitor<'a>>(visitor: &mut V, method: &'a MethodDecl) {
    if let Some(doc) = &method.doc {
        visitor.visit_doc(doc);
    }
    if let Some(ty) = &method.return_ty {
        visitor.visit_type_ref(ty);
    }
    for param in &method.params.params {
        visitor.visit_param(param);
    }
    if let Some(throws) = &method.throws {
        for ty in &throws.types {
            visitor.visit_type_ref(ty);
        }
    }
    if let Some(body) = &method.body {
        visitor.visit_block(body);
    }
}

pub fn walk_field<'a, V: Visitor<'a>>(visitor: &mut V, field: &'a FieldDecl) {
    if let Some(doc) = &field.doc {
        visitor.visit_doc(doc);
    }
    visitor.visit_type_ref(&field.ty);
    for var in &field.vars {
        if let Some(init) = &var.init {
            visitor.visit_expr(init);
        }
    }
}

pub fn walk_enum_constant<'a, V: Visitor<'a>>(visitor: &mut V, constant: &'a EnumConstant) {
    if let Some(args) = &constant.args {
        for arg in &args.args {
            visitor.visit_expr(arg);
        }
    }
    if let Some(body) = &constant.body {
        visitor.visit_class_body(body);
    }
}

pub fn walk_block<'a, V: Visitor<'a>>(visitor: &mut V, block: &'a Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'a, V: Visitor<'a>>(visitor: &mut V, stmt: &'a Stmt) {
    match stmt {
        Stmt::LocalVar(local) => {
            visitor.visit_type_ref(&local.ty);
            for var in &local.vars {
                if let Some(init) = &var.init {
                    visitor.visit_expr(init);
                }
            }
        }
        Stmt::LocalType(decl) => visitor.visit_type_decl(decl),
        Stmt::Expr(stmt) => visitor.visit_expr(&stmt.expr),
        Stmt::Return(stmt) => {
            if let Some(expr) = &stmt.expr {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Throw(stmt) => visitor.visit_expr(&stmt.expr),
        Stmt::If(stmt) => {
            visitor.visit_expr(&stmt.cond);
            visitor.visit_stmt(&stmt.then_branch);
            if let Some(else_branch) = &stmt.else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        Stmt::While(stmt) => {
            visitor.visit_expr(&stmt.cond);
            visitor.visit_stmt(&stmt.body);
        }
        Stmt::Do(stmt) => {
            visitor.visit_stmt(&stmt.body);
            visitor.visit_expr(&stmt.cond);
        }
        Stmt::For(stmt) => {
            for init in &stmt.init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = &stmt.cond {
                visitor.visit_expr(cond);
            }
            for update in &stmt.update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(&stmt.body);
        }
        Stmt::ForEach(stmt) => {
            visitor.visit_type_ref(&stmt.ty);
            visitor.visit_expr(&stmt.iterable);
            visitor.visit_stmt(&stmt.body);
        }
        Stmt::Try(stmt) => {
            for resource in &stmt.resources {
                visitor.visit_stmt(resource);
            }
            visitor.visit_block(&stmt.body);
            for catch in &stmt.catches {
                for ty in &catch.types {
                    visitor.visit_type_ref(ty);
                }
                visitor.visit_block(&catch.body);
            }
            if let Some(finally) = &stmt.finally {
                visitor.visit_block(finally);
            }
        }
        Stmt::Switch(block) => walk_switch_block(visitor, block),
        Stmt::Sync(stmt) => {
            visitor.visit_expr(&stmt.lock);
            visitor.visit_block(&stmt.body);
        }
        Stmt::Labeled(stmt) => visitor.visit_stmt(&stmt.stmt),
        Stmt::Assert(stmt) => {
            visitor.visit_expr(&stmt.cond);
            if let Some(message) = &stmt.message {
                visitor.visit_expr(message);
            }
        }
        Stmt::Block(block) => visitor.visit_block(block),
        Stmt::Jump(_) | Stmt::Empty(_) => {}
    }
}

pub fn walk_switch_block<'a, V: Visitor<'a>>(visitor: &mut V, block: &'a SwitchBlock) {
    visitor.visit_expr(&block.selector);
    for case in &block.cases {
        for label in &case.labels {
            visitor.visit_expr(label);
        }
        for stmt in &case.body {
            visitor.visit_stmt(stmt);
        }
    }
}

pub fn walk_expr<'a, V: Visitor<'a>>(visitor: &mut V, expr: &'a Expr) {
    match expr {
        Expr::Name(_)
        | Expr::Literal(_)
        | Expr::This(_)
        | Expr::Super(_)
        | Expr::Missing(_) => {}
        Expr::FieldAccess(access) => visitor.visit_expr(&access.receiver),
        Expr::MethodCall(call) => {
            if let Some(receiver) = &call.receiver {
                visitor.visit_expr(receiver);
            }
            walk_args(visitor, &call.args);
        }
        Expr::New(new) => {
            if let Some(outer) = &new.outer {
                visitor.visit_expr(outer);
            }
            visitor.visit_type_ref(&new.ty);
            walk_args(visitor, &new.args);
            if let Some(body) = &new.body {
                visitor.visit_class_body(body);
            }
        }
        Expr::NewArray(new) => {
            visitor.visit_type_ref(&new.ty);
            for dim in &new.dims {
                visitor.visit_expr(dim);
            }
            if let Some(init) = &new.init {
                visitor.visit_expr(init);
            }
        }
        Expr::ArrayInit(init) => {
            for element in &init.elements {
                visitor.visit_expr(element);
            }
        }
        Expr::ConstructorCall(call) => walk_args(visitor, &call.args),
        Expr::MethodRef(method_ref) => visitor.visit_expr(&method_ref.target),
        Expr::Lambda(lambda) => {
            for param in &lambda.params {
                if let Some(ty) = &param.ty {
                    visitor.visit_type_ref(ty);
                }
            }
            match &lambda.body {
                LambdaBody::Expr(body) => visitor.visit_expr(body),
                LambdaBody::Block(body) => visitor.visit_block(body),
            }
        }
        Expr::Unary(unary) => visitor.visit_expr(&unary.operand),
        Expr::Binary(binary) => {
            visitor.visit_expr(&binary.lhs);
            visitor.visit_expr(&binary.rhs);
        }
        Expr::Assign(assign) => {
            visitor.visit_expr(&assign.lhs);
            visitor.visit_expr(&assign.rhs);
        }
        Expr::Conditional(cond) => {
            visitor.visit_expr(&cond.cond);
            visitor.visit_expr(&cond.then_expr);
            visitor.visit_expr(&cond.else_expr);
        }
        Expr::Cast(cast) => {
            visitor.visit_type_ref(&cast.ty);
            visitor.visit_expr(&cast.expr);
        }
        Expr::InstanceOf(instance_of) => {
            visitor.visit_expr(&instance_of.expr);
            visitor.visit_type_ref(&instance_of.ty);
        }
        Expr::ArrayAccess(access) => {
            visitor.visit_expr(&access.array);
            visitor.visit_expr(&access.index);
        }
        Expr::Paren(paren) => visitor.visit_expr(&paren.inner),
        Expr::ClassLiteral(literal) => visitor.visit_type_ref(&literal.ty),
        Expr::Switch(switch) => walk_switch_block(visitor, &switch.block),
    }
}

fn walk_args<'a, V: Visitor<'a>>(visitor: &mut V, args: &'a ArgList) {
    for arg in &args.args {
        visitor.visit_expr(arg);
    }
}

/// Every method and constructor declared anywhere in `unit`, including local
/// and anonymous classes, in source order.
pub fn all_methods(unit: &CompilationUnit) -> Vec<&MethodDecl> {
    struct Collect<'a>(Vec<&'a MethodDecl>);

    impl<'a> Visitor<'a> for Collect<'a> {
        fn visit_method(&mut self, method: &'a MethodDecl) {
            self.0.push(method);
            walk_method(self, method);
        }
    }

    let mut collect = Collect(Vec::new());
    walk_compilation_unit(&mut collect, unit);
    collect.0
}

/// Every type declaration in `unit`, outer types first.
pub fn all_type_decls(unit: &CompilationUnit) -> Vec<&TypeDecl> {
    struct Collect<'a>(Vec<&'a TypeDecl>);

    impl<'a> Visitor<'a> for Collect<'a> {
        fn visit_type_decl(&mut self, decl: &'a TypeDecl) {
            self.0.push(decl);
            walk_type_decl(self, decl);
        }
    }

    let mut collect = Collect(Vec::new());
    walk_compilation_unit(&mut collect, unit);
    collect.0
}
