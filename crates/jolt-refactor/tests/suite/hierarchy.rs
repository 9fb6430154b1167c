use jolt_index::Workspace;
use jolt_refactor::{ChangeSignatureOptions, Problem, Severity};
use pretty_assertions::assert_eq;

use super::{change_signature, change_signature_with, method};

fn interface_family() -> Workspace {
    Workspace::from_files([
        ("I.java", "interface I {\n    void m(int a);\n}\n"),
        ("A.java", "class A implements I {\n    public void m(int a) {}\n}\n"),
        (
            "B.java",
            "class B extends A {\n    public void m(int a) {\n        super.m(a);\n    }\n}\n",
        ),
        ("Use.java", "class Use {\n    void run(I i) {\n        i.m(1);\n    }\n}\n"),
    ])
}

#[test]
fn implementations_point_at_the_interface() {
    let workspace = interface_family();
    let outcome = change_signature(&workspace, "B", "m", |_| unreachable!("activation is fatal"));
    let entry = outcome.status.most_severe().expect("fatal entry");
    assert_eq!(entry.severity, Severity::Fatal);
    assert!(matches!(
        entry.problem,
        Problem::DeclaredInInterface { ref interface, .. } if interface == "I"
    ));
    assert_eq!(entry.alternate, Some(method(&workspace, "I", "m")));
}

#[test]
fn overriding_methods_point_at_the_overridden_one() {
    let text = "class A {\n    void m() {}\n}\n\nclass B extends A {\n    void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "B", "m", |_| unreachable!("activation is fatal"));
    let entry = outcome.status.most_severe().expect("fatal entry");
    assert!(matches!(
        entry.problem,
        Problem::OverridesAnother { ref declaring, .. } if declaring == "A"
    ));
    assert_eq!(entry.alternate, Some(method(&workspace, "A", "m")));
}

#[test]
fn the_whole_family_is_rewritten() {
    let workspace = interface_family();
    let outcome = change_signature(&workspace, "I", "m", |refactoring| {
        refactoring.state_mut().add_parameter("label", "String", "\"\"");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(outcome.preview("I.java"), "interface I {\n    void m(int a, String label);\n}\n");
    assert_eq!(
        outcome.preview("A.java"),
        "class A implements I {\n    public void m(int a, String label) {}\n}\n"
    );
    assert_eq!(
        outcome.preview("B.java"),
        "class B extends A {\n    public void m(int a, String label) {\n        super.m(a, label);\n    }\n}\n"
    );
    assert_eq!(
        outcome.preview("Use.java"),
        "class Use {\n    void run(I i) {\n        i.m(1, \"\");\n    }\n}\n"
    );
}

#[test]
fn renames_only_touch_members_using_the_old_name() {
    let text = "class A {\n    void m(int a) {}\n}\n\nclass B extends A {\n    void m(int other) {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().rename_parameter(0, "value").unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    void m(int value) {}\n}\n\nclass B extends A {\n    void m(int other) {}\n}\n"
    );
}

#[test]
fn new_names_must_be_free_in_every_override() {
    let text = "class A {\n    void m(int a, int b) {}\n}\n\nclass B extends A {\n    void m(int x, int y) {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().rename_parameter(0, "y").unwrap();
    });
    assert_eq!(
        outcome.problems(),
        vec![&Problem::ParameterNameCollision {
            method: "m".into(),
            declaring: "B".into(),
            name: "y".into(),
        }]
    );
}

fn constructor_hierarchy() -> Workspace {
    Workspace::from_files([
        ("A.java", "public class A {\n    public A() {\n    }\n}\n"),
        ("B.java", "public class B extends A {\n    int x;\n}\n"),
        (
            "C.java",
            "class C extends A {\n    C(int x) {\n        value = x;\n    }\n\n    int value;\n}\n",
        ),
        ("D.java", "class D {\n    Object make() {\n        return new A();\n    }\n}\n"),
        ("E.java", "class E extends A {}\n"),
    ])
}

#[test]
fn subclasses_call_the_new_constructor() {
    let workspace = constructor_hierarchy();
    let outcome = change_signature(&workspace, "A", "A", |refactoring| {
        refactoring.state_mut().add_parameter("size", "int", "10");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(outcome.preview("A.java"), "public class A {\n    public A(int size) {\n    }\n}\n");
    assert_eq!(
        outcome.preview("B.java"),
        "public class B extends A {\n    public B() {\n        super(10);\n    }\n    int x;\n}\n"
    );
    assert_eq!(
        outcome.preview("C.java"),
        "class C extends A {\n    C(int x) {\n        super(10);\n        value = x;\n    }\n\n    int value;\n}\n"
    );
    assert_eq!(
        outcome.preview("D.java"),
        "class D {\n    Object make() {\n        return new A(10);\n    }\n}\n"
    );
    assert_eq!(
        outcome.preview("E.java"),
        "class E extends A {\n    E() {\n        super(10);\n    }\n}\n"
    );
}

#[test]
fn constructor_ripple_can_be_disabled() {
    let workspace = constructor_hierarchy();
    let options = ChangeSignatureOptions {
        ripple_constructors: false,
        ..ChangeSignatureOptions::default()
    };
    let outcome = change_signature_with(&workspace, "A", "A", options, |refactoring| {
        refactoring.state_mut().add_parameter("size", "int", "10");
    });
    assert!(outcome.touches("A.java") && outcome.touches("D.java"));
    assert!(!outcome.touches("B.java") && !outcome.touches("C.java") && !outcome.touches("E.java"));
}
