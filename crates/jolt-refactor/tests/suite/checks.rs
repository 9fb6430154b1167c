use jolt_core::FileId;
use jolt_index::Workspace;
use jolt_refactor::{
    ChangeSignature, ChangeSignatureOptions, ChangeSignatureRequest, Problem, RefactorError,
    Severity,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use super::{change_signature, change_signature_with, method};

#[test]
fn an_unchanged_signature_is_fatal() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m(int a) {}\n}\n")]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        // Renaming back and forth leaves nothing to do.
        refactoring.state_mut().rename_parameter(0, "b").unwrap();
        refactoring.state_mut().rename_parameter(0, "a").unwrap();
    });
    assert_eq!(outcome.status.severity(), Some(Severity::Fatal));
    assert_eq!(outcome.problems(), vec![&Problem::Unchanged]);
    assert!(outcome.change.is_none());
}

#[test]
fn unresolved_exceptions_block_activation() {
    let workspace = Workspace::from_files([(
        "A.java",
        "class A {\n    void m() throws Missing {}\n}\n",
    )]);
    let outcome = change_signature(&workspace, "A", "m", |_| unreachable!("activation is fatal"));
    assert_eq!(
        outcome.problems(),
        vec![&Problem::UnresolvedException { name: "Missing".into() }]
    );
}

#[test]
fn unknown_types_are_errors() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m() {}\n}\n")]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_parameter("thing", "Missing", "null");
    });
    assert!(outcome
        .problems()
        .contains(&&Problem::TypeNotFound { name: "Missing".into() }));
}

#[test]
fn ambiguous_simple_names_are_errors() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m() {}\n}\n")]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_parameter("when", "Date", "null");
    });
    assert!(outcome.problems().contains(&&Problem::AmbiguousType {
        name: "Date".into(),
        candidates: "java.sql.Date, java.util.Date".into(),
    }));
}

#[test]
fn simple_names_resolve_through_imports() {
    let text = "import java.util.Date;\n\nclass A {\n    void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let cancel = CancellationToken::new();
    let mut refactoring = ChangeSignature::new(
        &workspace,
        method(&workspace, "A", "m"),
        ChangeSignatureOptions::default(),
    )
    .unwrap();
    assert!(refactoring.check_activation(&cancel).is_ok());
    refactoring.state_mut().add_parameter("when", "Date", "null");
    let status = refactoring.check_input(&cancel);
    assert!(status.is_ok(), "{:?}", status.messages());
    assert_eq!(refactoring.state().parameters()[0].new_type(), "java.util.Date");
    assert_eq!(refactoring.signature_preview(), "void m(java.util.Date when)");
}

#[test]
fn new_compile_errors_are_reported() {
    let text = "class A {\n    void m(int a) {}\n\n    void n(int b) {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_method_name("n").unwrap();
    });
    let entry = outcome.status.most_severe().expect("compile error");
    assert_eq!(entry.severity, Severity::Error);
    assert!(matches!(entry.problem, Problem::CompileError { code: "duplicate-method", .. }));
    assert_eq!(entry.context.as_ref().map(|context| &context.file), Some(&FileId::new("A.java")));

    let options = ChangeSignatureOptions {
        compile_check: false,
        ..ChangeSignatureOptions::default()
    };
    let unchecked = change_signature_with(&workspace, "A", "m", options, |refactoring| {
        refactoring.set_method_name("n").unwrap();
    });
    assert!(unchecked.status.is_ok(), "{:?}", unchecked.status.messages());
}

#[test]
fn existing_compile_errors_are_not_blamed_on_the_change() {
    let text = "class A {\n    void m(int a) {\n        missing();\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().rename_parameter(0, "b").unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
}

#[test]
fn native_methods_keep_their_order() {
    let workspace = Workspace::from_files([(
        "A.java",
        "class A {\n    native void m(int a, int b);\n}\n",
    )]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().reorder(&[1, 0]).unwrap();
    });
    assert_eq!(
        outcome.problems(),
        vec![&Problem::NativeReorder {
            method: "m".into(),
            declaring: "A".into(),
        }]
    );
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    native void m(int b, int a);\n}\n"
    );
}

#[test]
fn read_only_files_are_fatal() {
    let mut workspace = Workspace::from_files([
        ("A.java", "class A {\n    void m(int a) {}\n}\n"),
        ("B.java", "class B {\n    void run(A a) {\n        a.m(1);\n    }\n}\n"),
    ]);
    workspace.set_read_only(&FileId::new("B.java"), true);

    let cancel = CancellationToken::new();
    let mut refactoring = ChangeSignature::new(
        &workspace,
        method(&workspace, "A", "m"),
        ChangeSignatureOptions::default(),
    )
    .unwrap();
    refactoring.state_mut().add_parameter("b", "int", "0");
    let status = refactoring.check_all(&cancel);
    let problems: Vec<&Problem> = status.entries().iter().map(|entry| &entry.problem).collect();
    assert_eq!(
        problems,
        vec![&Problem::ReadOnlyFile {
            file: FileId::new("B.java")
        }]
    );
    assert_eq!(refactoring.create_change(), Err(RefactorError::StaleSession));
}

#[test]
fn cancelled_checks_say_so() {
    let workspace = Workspace::from_files([
        ("A.java", "class A {\n    void m(int a) {}\n}\n"),
        ("B.java", "class B {\n    void run(A a) {\n        a.m(1);\n    }\n}\n"),
    ]);
    let mut refactoring = ChangeSignature::new(
        &workspace,
        method(&workspace, "A", "m"),
        ChangeSignatureOptions::default(),
    )
    .unwrap();
    assert!(refactoring.check_activation(&CancellationToken::new()).is_ok());
    refactoring.state_mut().add_parameter("b", "int", "0");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let status = refactoring.check_input(&cancel);
    assert!(status.was_cancelled());
    assert!(!status.has_fatal());
}

#[test]
fn every_check_starts_a_new_session() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m(int a) {}\n}\n")]);
    let cancel = CancellationToken::new();
    let mut refactoring = ChangeSignature::new(
        &workspace,
        method(&workspace, "A", "m"),
        ChangeSignatureOptions::default(),
    )
    .unwrap();
    refactoring.state_mut().rename_parameter(0, "b").unwrap();
    assert!(refactoring.check_all(&cancel).is_ok());
    assert_eq!(refactoring.override_family().map(<[_]>::len), Some(1));
    assert_eq!(refactoring.occurrence_files(), vec![&FileId::new("A.java")]);

    // Editing after the check invalidates it until the next check.
    refactoring.state_mut().rename_parameter(0, "c").unwrap();
    assert_eq!(refactoring.create_change(), Err(RefactorError::StaleSession));
    assert!(refactoring.check_input(&cancel).is_ok());
    let change = refactoring.create_change().unwrap();
    assert_eq!(
        change.preview(&FileId::new("A.java")).unwrap(),
        "class A {\n    void m(int c) {}\n}\n"
    );
    // The session is handed out once.
    assert_eq!(refactoring.create_change(), Err(RefactorError::StaleSession));
}

#[test]
fn requests_describe_a_whole_change() {
    let text = "class A {\n    int f(int a, int b) {\n        return b;\n    }\n\n    int use() {\n        return f(1, 2);\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let request: ChangeSignatureRequest = serde_json::from_str(
        r#"{
            "parameters": [
                { "existing": { "old_index": 1 } },
                { "add": { "name": "flag", "ty": "boolean", "default_value": "false" } }
            ],
            "new_name": "g"
        }"#,
    )
    .unwrap();
    let outcome = change_signature(&workspace, "A", "f", |refactoring| {
        refactoring.apply_request(&request).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    int g(int b, boolean flag) {\n        return b;\n    }\n\n    int use() {\n        return g(2, false);\n    }\n}\n"
    );
}

#[test]
fn a_fatal_drops_earlier_warnings() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m(int a) {}\n}\n")]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().rename_parameter(0, "Big").unwrap();
        refactoring.set_method_name("1x").unwrap();
    });
    assert_eq!(outcome.problems(), vec![&Problem::InvalidIdentifier { name: "1x".into() }]);
    assert!(outcome.change.is_none());
}

#[test]
fn added_exceptions_match_declared_ones_by_type() {
    let text = "import java.io.IOException;\n\nclass A {\n    void m() throws IOException {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);

    let only = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_exception("IOException");
    });
    assert_eq!(only.problems(), vec![&Problem::Unchanged]);

    let renamed = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_exception("IOException");
        refactoring.set_method_name("n").unwrap();
    });
    assert!(renamed.status.is_ok(), "{:?}", renamed.status.messages());
    assert_eq!(
        renamed.preview("A.java"),
        "import java.io.IOException;\n\nclass A {\n    void n() throws IOException {}\n}\n"
    );
}

#[test]
fn added_exceptions_must_resolve() {
    let workspace = Workspace::from_files([("A.java", "class A {\n    void m() {}\n}\n")]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_exception("NoSuchThing");
    });
    let entry = outcome
        .status
        .entries()
        .iter()
        .find(|entry| entry.problem == Problem::TypeNotFound { name: "NoSuchThing".into() })
        .expect("unresolved exception reported");
    assert_eq!(entry.severity, Severity::Error);
}

#[test]
fn simple_exception_names_are_qualified() {
    let workspace = Workspace::from_files([(
        "A.java",
        "import java.io.*;\n\nclass A {\n    void m() {}\n}\n",
    )]);
    let cancel = CancellationToken::new();
    let mut refactoring = ChangeSignature::new(
        &workspace,
        method(&workspace, "A", "m"),
        ChangeSignatureOptions::default(),
    )
    .unwrap();
    assert!(refactoring.check_activation(&cancel).is_ok());
    refactoring.state_mut().add_exception("EOFException");
    let status = refactoring.check_input(&cancel);
    assert!(status.is_ok(), "{:?}", status.messages());
    let names: Vec<&str> = refactoring
        .state()
        .exceptions()
        .iter()
        .map(|info| info.qualified_name())
        .collect();
    assert_eq!(names, vec!["java.io.EOFException"]);
}
