use jolt_index::Workspace;
use jolt_refactor::{ChangeSignatureOptions, Problem, Severity};
use pretty_assertions::assert_eq;

use super::{change_signature, change_signature_with};

#[test]
fn recursive_calls_pass_the_new_parameter_on() {
    let text = "class A {\n    int fact(int n) {\n        if (n <= 1) {\n            return 1;\n        }\n        return n * fact(n - 1);\n    }\n\n    int use() {\n        return fact(5);\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "fact", |refactoring| {
        let state = refactoring.state_mut();
        state.rename_parameter(0, "k").unwrap();
        state.add_parameter("acc", "int", "1");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    int fact(int k, int acc) {\n        if (k <= 1) {\n            return 1;\n        }\n        return k * fact(k - 1, acc);\n    }\n\n    int use() {\n        return fact(5, 1);\n    }\n}\n"
    );
}

#[test]
fn variable_arguments_move_as_one() {
    let text = "class Log {\n    void log(String format, Object... args) {}\n\n    void run() {\n        log(\"a\", 1, 2);\n        log(\"b\");\n    }\n}\n";
    let workspace = Workspace::from_files([("Log.java", text)]);
    let outcome = change_signature(&workspace, "Log", "log", |refactoring| {
        let state = refactoring.state_mut();
        let added = state.add_parameter("level", "int", "0");
        state.move_parameter(added, 0).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("Log.java"),
        "class Log {\n    void log(int level, String format, Object... args) {}\n\n    void run() {\n        log(0, \"a\", 1, 2);\n        log(0, \"b\");\n    }\n}\n"
    );
}

#[test]
fn enum_constants_gain_arguments() {
    let text = "enum Color {\n    RED, GREEN;\n\n    Color() {}\n}\n";
    let workspace = Workspace::from_files([("Color.java", text)]);
    let outcome = change_signature(&workspace, "Color", "Color", |refactoring| {
        refactoring.state_mut().add_parameter("code", "int", "0");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("Color.java"),
        "enum Color {\n    RED(0), GREEN(0);\n\n    Color(int code) {}\n}\n"
    );
}

#[test]
fn enum_constants_with_arguments_are_reordered() {
    let text = "enum Size {\n    SMALL(1, \"s\");\n\n    Size(int weight, String label) {}\n}\n";
    let workspace = Workspace::from_files([("Size.java", text)]);
    let outcome = change_signature(&workspace, "Size", "Size", |refactoring| {
        refactoring.state_mut().reorder(&[1, 0]).unwrap();
    });
    assert_eq!(
        outcome.preview("Size.java"),
        "enum Size {\n    SMALL(\"s\", 1);\n\n    Size(String label, int weight) {}\n}\n"
    );
}

const DOCUMENTED: &str = "class A {\n    /** Delegates to {@link #m(int, String)}. */\n    void run() {\n        m(1, \"x\");\n    }\n\n    void m(int a, String b) {}\n}\n";

#[test]
fn doc_references_follow_the_signature() {
    let workspace = Workspace::from_files([("A.java", DOCUMENTED)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_method_name("apply").unwrap();
        refactoring.state_mut().reorder(&[1, 0]).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    /** Delegates to {@link #apply(String, int)}. */\n    void run() {\n        apply(\"x\", 1);\n    }\n\n    void apply(String b, int a) {}\n}\n"
    );
}

#[test]
fn doc_references_can_be_left_alone() {
    let workspace = Workspace::from_files([("A.java", DOCUMENTED)]);
    let options = ChangeSignatureOptions {
        update_doc_references: false,
        ..ChangeSignatureOptions::default()
    };
    let outcome = change_signature_with(&workspace, "A", "m", options, |refactoring| {
        refactoring.set_method_name("apply").unwrap();
    });
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    /** Delegates to {@link #m(int, String)}. */\n    void run() {\n        apply(1, \"x\");\n    }\n\n    void apply(int a, String b) {}\n}\n"
    );
}

#[test]
fn method_references_are_reported() {
    let text = "class A {\n    void m() {}\n\n    Runnable task = this::m;\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_method_name("go").unwrap();
    });

    let entry = outcome
        .status
        .entries()
        .iter()
        .find(|entry| matches!(entry.problem, Problem::UnrecognizedOccurrence { .. }))
        .expect("method reference reported");
    assert_eq!(entry.severity, Severity::Error);
    let Problem::UnrecognizedOccurrence { text: found, .. } = &entry.problem else {
        unreachable!()
    };
    assert!(found.ends_with("::m"), "{found}");

    // Everything else is still rewritten.
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    void go() {}\n\n    Runnable task = this::m;\n}\n"
    );
}

#[test]
fn calls_in_other_files_are_rewritten() {
    let workspace = Workspace::from_files([
        ("A.java", "class A {\n    void m(int a, int b) {}\n}\n"),
        (
            "B.java",
            "class B {\n    void run(A a) {\n        a.m(1, 2);\n        new A().m(3, 4);\n    }\n}\n",
        ),
    ]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().reorder(&[1, 0]).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("B.java"),
        "class B {\n    void run(A a) {\n        a.m(2, 1);\n        new A().m(4, 3);\n    }\n}\n"
    );
}
