use jolt_core::FileId;
use jolt_index::{Cancelled, Workspace};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use super::{method, single};

fn labels(workspace: &Workspace, family: &[jolt_index::MethodId]) -> Vec<String> {
    let mut out: Vec<String> = family
        .iter()
        .map(|&id| workspace.model().method_label(id))
        .collect();
    out.sort();
    out
}

#[test]
fn override_family_spans_interfaces_and_subclasses() {
    let (workspace, _) = single(
        r#"interface I { void m(int x); }
class A implements I { public void m(int x) {} }
class B extends A { public void m(int x) {} }
class C implements I { public void m(int x) {} }
class D { void m(int x) {} }
class E extends A { public void m(long x) {} }
"#,
    );
    let family = workspace
        .override_family(method(&workspace, "B", "m"), &CancellationToken::new())
        .expect("not cancelled");
    assert_eq!(
        labels(&workspace, &family),
        vec!["A.m(int)", "B.m(int)", "C.m(int)", "I.m(int)"]
    );
}

#[test]
fn type_variables_match_their_instantiation() {
    let (workspace, _) = single(
        r#"class Box<T> { void put(T value) {} }
class IntBox extends Box<Integer> { void put(Integer value) {} }
"#,
    );
    let family = workspace
        .override_family(method(&workspace, "IntBox", "put"), &CancellationToken::new())
        .expect("not cancelled");
    assert_eq!(labels(&workspace, &family), vec!["Box.put(T)", "IntBox.put(Integer)"]);
}

#[test]
fn static_private_and_constructors_stand_alone() {
    let (workspace, _) = single(
        r#"class A {
    A() {}
    static void s() {}
    private void p() {}
}
class B extends A {
    B() {}
    static void s() {}
    private void p() {}
}
"#,
    );
    let cancel = CancellationToken::new();
    for name in ["A", "s", "p"] {
        let target = method(&workspace, "A", name);
        assert_eq!(workspace.override_family(target, &cancel), Ok(vec![target]));
    }
}

#[test]
fn cancelled_searches_stop() {
    let (workspace, _) = single("class A { void m() {} } class B extends A { void m() {} }");
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        workspace.override_family(method(&workspace, "A", "m"), &cancel),
        Err(Cancelled)
    );
    assert_eq!(
        workspace.occurrences(&[method(&workspace, "A", "m")], &cancel),
        Err(Cancelled)
    );
}

#[test]
fn occurrences_are_grouped_per_file() {
    let workspace = Workspace::from_files([
        ("p/A.java", "package p;\npublic class A {\n    public void m() {}\n}\n"),
        (
            "q/B.java",
            "package q;\nimport p.A;\nclass B {\n    void use(A a) { a.m(); a.m(); }\n}\n",
        ),
        ("q/C.java", "package q;\nclass C {}\n"),
    ]);
    let target = method(&workspace, "p.A", "m");
    let found = workspace
        .occurrences(&[target], &CancellationToken::new())
        .expect("not cancelled");
    let counts: Vec<(String, usize)> = found
        .iter()
        .map(|(file, nodes)| (file.to_string(), nodes.len()))
        .collect();
    assert_eq!(
        counts,
        vec![("p/A.java".to_string(), 1), ("q/B.java".to_string(), 2)]
    );
}

#[test]
fn direct_subclasses_skip_anonymous_and_indirect_ones() {
    let (workspace, file) = single(
        r#"class A {}
class B extends A {}
class C extends B {}
interface I {}
class D {
    Object x = new A() {};
}
"#,
    );
    let model = workspace.model();
    let a = model.type_by_qualified_name("A").expect("A");
    let names: Vec<&str> = workspace
        .direct_subclasses(a)
        .into_iter()
        .map(|id| model.type_info(id).name.as_str())
        .collect();
    assert_eq!(names, vec!["B"]);
    assert!(workspace.diagnostics(&file).is_empty());
}

#[test]
fn visible_types_cover_the_jdk_and_package_access() {
    let workspace = Workspace::from_files([
        ("p/List.java", "package p;\nclass List {}\n"),
        ("q/Use.java", "package q;\nclass Use {}\n"),
    ]);
    let model = workspace.model();
    assert_eq!(
        model.visible_types("List", "q"),
        vec!["java.awt.List".to_string(), "java.util.List".to_string()]
    );
    assert_eq!(
        model.visible_types("List", "p"),
        vec![
            "java.awt.List".to_string(),
            "java.util.List".to_string(),
            "p.List".to_string()
        ]
    );
}

#[test]
fn names_resolve_from_inside_a_type() {
    let workspace = Workspace::from_files([
        (
            "p/Star.java",
            "package p;\nimport java.util.*;\nimport java.awt.*;\nclass Star {}\n",
        ),
        (
            "p/Single.java",
            "package p;\nimport java.util.List;\nimport java.awt.*;\nclass Single {}\n",
        ),
    ]);
    let model = workspace.model();
    let star = model.type_by_qualified_name("p.Star").expect("Star");
    let single = model.type_by_qualified_name("p.Single").expect("Single");

    let mut ambiguous = model.resolve_in_type(star, &[], "List");
    ambiguous.sort();
    assert_eq!(ambiguous, vec!["java.awt.List", "java.util.List"]);
    assert_eq!(model.resolve_in_type(single, &[], "List<String>"), vec!["java.util.List"]);
    assert_eq!(model.resolve_in_type(single, &[], "int"), vec!["int"]);
    assert_eq!(model.resolve_in_type(single, &["T".to_string()], "T"), vec!["T"]);
    assert!(model.resolve_in_type(single, &[], "Nope").is_empty());
}

#[test]
fn read_only_files_are_reported() {
    let mut workspace = Workspace::from_files([("A.java", "class A {}")]);
    let file = FileId::new("A.java");
    assert!(!workspace.is_read_only(&file));
    workspace.set_read_only(&file, true);
    assert!(workspace.is_read_only(&file));
}
