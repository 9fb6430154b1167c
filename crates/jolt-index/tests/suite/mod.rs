mod binding;
mod diagnostics;
mod hierarchy;

use jolt_core::FileId;
use jolt_index::{MethodId, Workspace};
use jolt_syntax::ast::{Expr, NodeId};
use jolt_syntax::visit::{self, Visitor};

pub(crate) fn single(text: &str) -> (Workspace, FileId) {
    (Workspace::from_files([("A.java", text)]), FileId::new("A.java"))
}

/// The unique method `Type.name` declared in source.
pub(crate) fn method(workspace: &Workspace, ty: &str, name: &str) -> MethodId {
    let found = workspace.find_methods(ty, name, None);
    assert_eq!(found.len(), 1, "expected one {ty}.{name}, found {found:?}");
    found[0]
}

/// Ids of every call-like expression in source order, paired with the
/// callee name (`new` for instance creation, `this`/`super` for constructor
/// calls).
pub(crate) fn calls(workspace: &Workspace, file: &FileId) -> Vec<(String, NodeId)> {
    struct Collect(Vec<(String, NodeId)>);

    impl<'a> Visitor<'a> for Collect {
        fn visit_expr(&mut self, expr: &'a Expr) {
            match expr {
                Expr::MethodCall(call) => self.0.push((call.name.text.clone(), call.id)),
                Expr::New(new) => self.0.push(("new".to_string(), new.id)),
                Expr::ConstructorCall(call) => {
                    let keyword = match call.kind {
                        jolt_syntax::ast::ConstructorCallKind::This => "this",
                        jolt_syntax::ast::ConstructorCallKind::Super => "super",
                    };
                    self.0.push((keyword.to_string(), call.id));
                }
                Expr::MethodRef(method_ref) => {
                    self.0.push((format!("::{}", method_ref.name.text), method_ref.id))
                }
                _ => {}
            }
            visit::walk_expr(self, expr);
        }
    }

    let unit = workspace.unit(file).expect("unit");
    let mut collect = Collect(Vec::new());
    visit::walk_compilation_unit(&mut collect, unit.unit());
    collect.0
}

pub(crate) fn diagnostic_codes(workspace: &Workspace, file: &FileId) -> Vec<&'static str> {
    workspace
        .diagnostics(file)
        .iter()
        .map(|diagnostic| diagnostic.code)
        .collect()
}
