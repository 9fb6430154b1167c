use jolt_syntax::ast::{Member, Stmt};
use pretty_assertions::assert_eq;

use super::{calls, method, single};

#[test]
fn overloads_are_selected_by_argument_types() {
    let (workspace, file) = single(
        r#"class A {
    void m(int x) {}
    void m(String s) {}
    void m(int x, int y) {}
    void m(Object o) {}
    void use(long l) { m(1); m("a"); m(1, 2); m(new A()); m(l); }
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let model = workspace.model();
    let bound: Vec<Vec<String>> = calls(&workspace, &file)
        .into_iter()
        .filter(|(name, _)| name == "m")
        .map(|(_, node)| {
            let target = unit.bindings.method(node).expect("bound call");
            model.method(target).param_types.clone()
        })
        .collect();
    assert_eq!(
        bound,
        vec![
            vec!["int".to_string()],
            vec!["String".to_string()],
            vec!["int".to_string(), "int".to_string()],
            vec!["Object".to_string()],
            vec!["Object".to_string()],
        ]
    );
}

#[test]
fn constructor_calls_bind_to_constructors() {
    let (workspace, file) = single(
        r#"class Base {
    Base(int x) {}
}
class Sub extends Base {
    Sub() { super(1); }
    Sub(String s) { this(); }
}
class User {
    Object o = new Sub("x");
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let model = workspace.model();
    let labels: Vec<String> = calls(&workspace, &file)
        .into_iter()
        .map(|(name, node)| {
            let target = unit.bindings.method(node).expect("bound");
            format!("{name} -> {}", model.method_label(target))
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            "super -> Base.Base(int)",
            "this -> Sub.Sub()",
            "new -> Sub.Sub(String)",
        ]
    );
}

#[test]
fn calls_inside_anonymous_classes_see_the_enclosing_type() {
    let (workspace, file) = single(
        r#"class A {
    void helper() {}
    void run() {
        Runnable r = new Runnable() {
            public void run() { helper(); }
        };
    }
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let helper = method(&workspace, "A", "helper");
    let call = calls(&workspace, &file)
        .into_iter()
        .find(|(name, _)| name == "helper")
        .map(|(_, node)| node)
        .expect("helper call");
    assert_eq!(unit.bindings.method(call), Some(helper));
    assert!(workspace.diagnostics(&file).is_empty(), "{:?}", workspace.diagnostics(&file));
}

#[test]
fn doc_references_bind_by_arity_and_type_names() {
    let (workspace, file) = single(
        r#"class A {
    /**
     * See {@link #m(String)} and {@link #m(int, int)}, or just {@link #m}.
     * @see B#n()
     */
    void doc() {}
    void m(int a, int b) {}
    void m(String s) {}
}
class B {
    void n() {}
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let model = workspace.model();
    let decl = unit.unit().types[0]
        .methods()
        .find(|method| method.name.text == "doc")
        .expect("doc method");
    let labels: Vec<Option<String>> = decl
        .doc
        .as_ref()
        .expect("doc comment")
        .method_refs
        .iter()
        .map(|reference| unit.bindings.method(reference.id).map(|id| model.method_label(id)))
        .collect();
    assert_eq!(
        labels,
        vec![
            Some("A.m(String)".to_string()),
            Some("A.m(int, int)".to_string()),
            Some("A.m(int, int)".to_string()),
            Some("B.n()".to_string()),
        ]
    );
}

#[test]
fn parameter_references_are_bound_until_shadowed() {
    let (workspace, file) = single(
        r#"class A {
    int m(int a) {
        int b = a + 1;
        Runnable r = () -> System.out.println(a);
        return b * a;
    }
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let Member::Method(decl) = &unit.unit().types[0].body.members[0] else {
        panic!("expected method");
    };
    let param = decl.params.params[0].name.id;
    assert_eq!(unit.bindings.references_to(param).count(), 3);

    let Stmt::LocalVar(local) = &decl.body.as_ref().expect("body").stmts[0] else {
        panic!("expected local");
    };
    assert_eq!(unit.bindings.references_to(local.vars[0].name.id).count(), 1);
}

#[test]
fn method_references_bind_to_the_first_named_method() {
    let (workspace, file) = single(
        r#"class A {
    void tick() {}
    void go() {
        Runnable r = this::tick;
        java.util.function.Supplier<A> s = A::new;
    }
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let model = workspace.model();
    let bound: Vec<String> = calls(&workspace, &file)
        .into_iter()
        .filter(|(name, _)| name.starts_with("::"))
        .filter_map(|(_, node)| unit.bindings.method(node))
        .map(|id| model.method_label(id))
        .collect();
    assert_eq!(bound, vec!["A.tick()".to_string()]);
}

#[test]
fn enum_constants_bind_to_enum_constructors() {
    let (workspace, file) = single(
        r#"enum Color {
    RED(1), GREEN, BLUE(2) { void shade() {} };
    Color(int value) {}
    Color() {}
}
"#,
    );
    let unit = workspace.unit(&file).expect("unit");
    let model = workspace.model();
    let labels: Vec<Option<String>> = unit.unit().types[0]
        .body
        .members
        .iter()
        .filter_map(|member| match member {
            Member::EnumConstant(constant) => Some(constant.id),
            _ => None,
        })
        .map(|node| unit.bindings.method(node).map(|id| model.method_label(id)))
        .collect();
    assert_eq!(
        labels,
        vec![
            Some("Color.Color(int)".to_string()),
            Some("Color.Color()".to_string()),
            Some("Color.Color(int)".to_string()),
        ]
    );
    assert!(workspace.diagnostics(&file).is_empty(), "{:?}", workspace.diagnostics(&file));
}
