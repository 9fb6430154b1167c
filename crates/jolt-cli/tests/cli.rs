use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn jolt() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jolt"))
}

const A: &str = "class A {\n    int m(int a) {\n        return a;\n    }\n}\n";
const B: &str = "class B {\n    int run(A a) {\n        return a.m(1);\n    }\n}\n";

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("src/A.java").write_str(A).unwrap();
    temp.child("src/B.java").write_str(B).unwrap();
    temp
}

fn add_parameter_request(temp: &TempDir) -> std::path::PathBuf {
    let request = temp.child("request.json");
    request
        .write_str(
            r#"{
  "target": { "file": "src/A.java", "type": "A", "method": "m" },
  "change": {
    "parameters": [
      { "existing": { "old_index": 0 } },
      { "add": { "name": "items", "ty": "java.util.List<String>", "default_value": "null" } }
    ]
  }
}"#,
        )
        .unwrap();
    request.path().to_path_buf()
}

#[test]
fn help_mentions_commands() {
    jolt().arg("--help").assert().success().stdout(
        predicate::str::contains("change-signature")
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("config-schema")),
    );
}

#[test]
fn config_schema_is_json() {
    let output = jolt().arg("config-schema").output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["refactor"].is_object(), "{schema:#}");
}

#[test]
fn check_reports_compile_errors() {
    let temp = TempDir::new().unwrap();
    temp.child("A.java")
        .write_str("class A {\n    void m() {\n        missing();\n    }\n}\n")
        .unwrap();

    let output = jolt().arg("check").arg(temp.path()).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files"], 1);
    assert_eq!(report["errors"], 1);
    assert_eq!(report["diagnostics"][0]["code"], "unresolved-method");
    assert_eq!(report["diagnostics"][0]["location"]["line"], 3);
}

#[test]
fn change_signature_previews_without_writing() {
    let temp = project();
    let request = add_parameter_request(&temp);

    let output = jolt()
        .arg("change-signature")
        .arg(temp.path())
        .arg("--request")
        .arg(&request)
        .arg("--json")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["applied"], false);
    assert!(report["entries"].as_array().unwrap().is_empty(), "{report:#}");
    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    let diff = files[0]["diff"].as_str().unwrap();
    assert!(diff.contains("+import java.util.List;"), "{diff}");
    assert!(diff.contains("+    int m(int a, List<String> items) {"), "{diff}");

    temp.child("src/A.java").assert(A);
    temp.child("src/B.java").assert(B);
}

#[test]
fn change_signature_applies() {
    let temp = project();
    let request = add_parameter_request(&temp);

    jolt()
        .arg("change-signature")
        .arg(temp.path())
        .arg("--request")
        .arg(&request)
        .arg("--apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("summary: applied 2 file(s)"));

    temp.child("src/A.java").assert(
        "import java.util.List;\n\nclass A {\n    int m(int a, List<String> items) {\n        return a;\n    }\n}\n",
    );
    temp.child("src/B.java")
        .assert("class B {\n    int run(A a) {\n        return a.m(1, null);\n    }\n}\n");
}

#[test]
fn config_can_turn_imports_off() {
    let temp = project();
    temp.child("jolt.toml")
        .write_str("[refactor.change_signature]\nadd_imports = false\n")
        .unwrap();
    let request = add_parameter_request(&temp);

    jolt()
        .arg("change-signature")
        .arg(temp.path())
        .arg("--request")
        .arg(&request)
        .arg("--apply")
        .assert()
        .success();

    temp.child("src/A.java").assert(predicate::str::contains(
        "int m(int a, java.util.List<String> items)",
    ));
}

#[test]
fn fatal_problems_exit_with_one() {
    let temp = project();
    let request = temp.child("request.json");
    request
        .write_str(r#"{ "target": { "type": "A", "method": "m" }, "change": {} }"#)
        .unwrap();

    let output = jolt()
        .arg("change-signature")
        .arg(temp.path())
        .arg("--request")
        .arg(request.path())
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["severity"], "fatal");
    assert!(report["files"].as_array().unwrap().is_empty());
}

#[test]
fn unknown_methods_are_usage_errors() {
    let temp = project();
    let request = temp.child("request.json");
    request
        .write_str(r#"{ "target": { "type": "A", "method": "missing" }, "change": {} }"#)
        .unwrap();

    jolt()
        .arg("change-signature")
        .arg(temp.path())
        .arg("--request")
        .arg(request.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no method `missing` found in type `A`"));
}
