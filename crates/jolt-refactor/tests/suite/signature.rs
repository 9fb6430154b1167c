use jolt_core::FileId;
use jolt_index::Workspace;
use jolt_refactor::{ChangeSignature, ChangeSignatureOptions, Problem, Severity, ADD_IMPORTS};
use jolt_syntax::ast::Visibility;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use super::{change_signature, change_signature_with, method};

#[test]
fn reorder_keeps_renames() {
    let text = "class A {\n    int m(int a, String b, long c) {\n        return a;\n    }\n\n    int use() {\n        return m(1, \"x\", 2L);\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        let state = refactoring.state_mut();
        state.rename_parameter(0, "first").unwrap();
        state.reorder(&[2, 0, 1]).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    int m(long c, int first, String b) {\n        return first;\n    }\n\n    int use() {\n        return m(2L, 1, \"x\");\n    }\n}\n"
    );
}

#[test]
fn deleting_a_used_parameter_is_an_error() {
    let text = "class A {\n    int m(int a, int b) {\n        return b;\n    }\n\n    int use() {\n        return m(1, 2);\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().delete_parameter(1).unwrap();
    });

    let entry = outcome
        .status
        .entries()
        .iter()
        .find(|entry| matches!(entry.problem, Problem::DeletedParameterStillUsed { .. }))
        .expect("deleted parameter reported");
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(
        entry.problem,
        Problem::DeletedParameterStillUsed {
            name: "b".into(),
            method: "m".into(),
            declaring: "A".into(),
        }
    );
    let context = entry.context.as_ref().expect("context");
    assert_eq!(context.file, FileId::new("A.java"));
    let use_site = text.find("return b").unwrap() + "return ".len();
    assert_eq!(context.range.map(|range| range.start), Some(use_site));

    // The change is still offered.
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    int m(int a) {\n        return b;\n    }\n\n    int use() {\n        return m(1);\n    }\n}\n"
    );
}

#[test]
fn every_use_of_a_deleted_parameter_is_reported() {
    let text = "class A {\n    int m(int a, int b) {\n        int c = b + a;\n        return c * b;\n    }\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().delete_parameter(1).unwrap();
    });
    let starts: Vec<Option<usize>> = outcome
        .status
        .entries()
        .iter()
        .filter(|entry| matches!(entry.problem, Problem::DeletedParameterStillUsed { .. }))
        .map(|entry| {
            let context = entry.context.as_ref()?;
            context.range.map(|range| range.start)
        })
        .collect();
    assert_eq!(
        starts,
        vec![Some(text.find("b + a").unwrap()), Some(text.find("b;").unwrap())]
    );
}

#[test]
fn added_parameters_get_their_default_at_call_sites() {
    let text = "class A {\n    int m(int a) {\n        return a;\n    }\n\n    int use() {\n        return m(1);\n    }\n}\n";
    let mut workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_parameter("b", "int", "0");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    let expected =
        "class A {\n    int m(int a, int b) {\n        return a;\n    }\n\n    int use() {\n        return m(1, 0);\n    }\n}\n";
    assert_eq!(outcome.preview("A.java"), expected);

    outcome.change.unwrap().commit(&mut workspace).unwrap();
    let file = FileId::new("A.java");
    assert_eq!(workspace.file_text(&file).as_deref(), Some(expected));
    assert!(workspace.diagnostics(&file).is_empty());

    // The committed signature parses back as requested, and asking for the
    // same signature again changes nothing.
    let id = method(&workspace, "A", "m");
    let info = workspace.model().method(id);
    assert_eq!(info.param_names, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(info.param_types, vec!["int".to_string(), "int".to_string()]);
    let again = change_signature(&workspace, "A", "m", |_| {});
    assert_eq!(again.problems(), vec![&Problem::Unchanged]);
}

#[test]
fn a_committed_signature_reads_back_as_requested() {
    let text = "package p;\n\nimport java.io.IOException;\n\npublic class A {\n    protected int m(int a, String b) throws IOException {\n        return a;\n    }\n\n    void use() throws IOException {\n        m(1, \"x\");\n    }\n}\n";
    let mut workspace = Workspace::from_files([("p/A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_method_name("n").unwrap();
        refactoring.set_return_type("long").unwrap();
        refactoring.set_visibility(Visibility::Public).unwrap();
        let state = refactoring.state_mut();
        state.reorder(&[1, 0]).unwrap();
        assert!(state.remove_exception("java.io.IOException"));
        state.add_exception("java.io.EOFException");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    outcome.change.unwrap().commit(&mut workspace).unwrap();
    let file = FileId::new("p/A.java");
    assert!(workspace.diagnostics(&file).is_empty(), "{:?}", workspace.diagnostics(&file));
    assert!(workspace.find_methods("A", "m", None).is_empty());

    let id = method(&workspace, "A", "n");
    let info = workspace.model().method(id);
    assert_eq!(info.visibility, Visibility::Public);
    assert_eq!(info.return_type.as_deref(), Some("long"));
    assert_eq!(info.param_names, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(info.param_types, vec!["String".to_string(), "int".to_string()]);
    assert_eq!(info.throws, vec!["EOFException".to_string()]);

    // Activation resolves the committed throws clause.
    let cancel = CancellationToken::new();
    let mut again =
        ChangeSignature::new(&workspace, id, ChangeSignatureOptions::default()).unwrap();
    assert!(again.check_activation(&cancel).is_ok());
    let thrown: Vec<&str> = again
        .state()
        .exceptions()
        .iter()
        .map(|info| info.qualified_name())
        .collect();
    assert_eq!(thrown, vec!["java.io.EOFException"]);
    assert_eq!(again.signature_preview(), "public long n(String b, int a) throws EOFException");
    assert_eq!(again.check_input(&cancel).messages(), vec![Problem::Unchanged.to_string()]);
}

#[test]
fn new_types_are_imported() {
    let text = "package p;\n\nclass A {\n    void m() {}\n\n    void use() {\n        m();\n    }\n}\n";
    let workspace = Workspace::from_files([("p/A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_parameter("items", "java.util.List<String>", "null");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("p/A.java"),
        "package p;\n\nimport java.util.List;\n\nclass A {\n    void m(List<String> items) {}\n\n    void use() {\n        m(null);\n    }\n}\n"
    );
    let change = outcome.change.as_ref().unwrap();
    assert_eq!(
        change.group_preview(&FileId::new("p/A.java"), ADD_IMPORTS).unwrap(),
        "package p;\n\nimport java.util.List;\n\nclass A {\n    void m() {}\n\n    void use() {\n        m();\n    }\n}\n"
    );
}

#[test]
fn without_imports_types_stay_qualified() {
    let text = "class A {\n    void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let options = ChangeSignatureOptions {
        add_imports: false,
        ..ChangeSignatureOptions::default()
    };
    let outcome = change_signature_with(&workspace, "A", "m", options, |refactoring| {
        refactoring.state_mut().add_parameter("items", "java.util.List<String>", "null");
    });
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    void m(java.util.List<String> items) {}\n}\n"
    );
}

#[test]
fn type_changes_drop_c_style_dimensions() {
    let text = "class A {\n    void m(int a[]) {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().set_parameter_type(0, "java.util.List<String>").unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "import java.util.List;\n\nclass A {\n    void m(List<String> a) {}\n}\n"
    );
}

#[test]
fn name_and_return_type_change_together() {
    let text = "class Box {\n    int size() {\n        return 0;\n    }\n\n    int twice() {\n        return size() * 2;\n    }\n}\n";
    let workspace = Workspace::from_files([("Box.java", text)]);
    let outcome = change_signature(&workspace, "Box", "size", |refactoring| {
        refactoring.set_method_name("count").unwrap();
        refactoring.set_return_type("long").unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("Box.java"),
        "class Box {\n    long count() {\n        return 0;\n    }\n\n    int twice() {\n        return count() * 2;\n    }\n}\n"
    );
}

#[test]
fn widening_skips_members_that_are_visible_enough() {
    let text = "class A {\n    void m() {}\n}\n\nclass B extends A {\n    void m() {}\n}\n\nclass C extends B {\n    public void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_visibility(Visibility::Protected).unwrap();
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    protected void m() {}\n}\n\nclass B extends A {\n    protected void m() {}\n}\n\nclass C extends B {\n    public void m() {}\n}\n"
    );
}

#[test]
fn narrowing_to_private_warns_about_overriders() {
    let text = "class A {\n    public void m() {}\n}\n\nclass B extends A {\n    public void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_visibility(Visibility::Private).unwrap();
    });
    assert_eq!(outcome.status.severity(), Some(Severity::Warning));
    assert!(matches!(outcome.problems()[..], [Problem::PrivateWithOverriders { .. }]));
    assert_eq!(
        outcome.preview("A.java"),
        "class A {\n    private void m() {}\n}\n\nclass B extends A {\n    private void m() {}\n}\n"
    );
}

#[test]
fn package_access_removes_the_keyword() {
    let text = "class A {\n    protected void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.set_visibility(Visibility::Package).unwrap();
    });
    assert_eq!(outcome.preview("A.java"), "class A {\n    void m() {}\n}\n");
}

#[test]
fn exceptions_are_added_and_removed() {
    let text = "import java.io.IOException;\n\nclass A {\n    void m() throws IOException, InterruptedException {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        let state = refactoring.state_mut();
        assert!(state.remove_exception("java.lang.InterruptedException"));
        state.add_exception("java.io.EOFException");
    });
    assert!(outcome.status.is_ok(), "{:?}", outcome.status.messages());
    assert_eq!(
        outcome.preview("A.java"),
        "import java.io.IOException;\nimport java.io.EOFException;\n\nclass A {\n    void m() throws IOException, EOFException {}\n}\n"
    );
}

#[test]
fn removing_the_last_exception_drops_the_clause() {
    let text = "import java.io.IOException;\n\nclass A {\n    void m() throws IOException {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        assert!(refactoring.state_mut().remove_exception("java.io.IOException"));
    });
    assert_eq!(
        outcome.preview("A.java"),
        "import java.io.IOException;\n\nclass A {\n    void m() {}\n}\n"
    );
}

#[test]
fn first_exception_opens_a_clause() {
    let text = "class A {\n    void m() {}\n}\n";
    let workspace = Workspace::from_files([("A.java", text)]);
    let outcome = change_signature(&workspace, "A", "m", |refactoring| {
        refactoring.state_mut().add_exception("java.io.IOException");
    });
    assert_eq!(
        outcome.preview("A.java"),
        "import java.io.IOException;\n\nclass A {\n    void m() throws IOException {}\n}\n"
    );
}
