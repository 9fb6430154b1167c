use jolt_config::{ConfigError, ConfigWarning, JoltConfig};
use pretty_assertions::assert_eq;

#[test]
fn empty_input_is_the_default_config() {
    let (config, warnings) = JoltConfig::load_from_str("").expect("load");
    assert_eq!(config, JoltConfig::default());
    assert!(warnings.is_empty());

    let change_signature = &config.refactor.change_signature;
    assert!(change_signature.compile_check);
    assert!(change_signature.update_doc_references);
    assert!(change_signature.add_imports);
    assert!(change_signature.ripple_constructors);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.stderr);
    assert!(!config.logging.json);
}

#[test]
fn unknown_keys_are_warnings() {
    let text = r#"
colour = "blue"

[logging]
json = true

[refactor.change_signature]
compile_check = false
ripple = true
"#;
    let (config, warnings) = JoltConfig::load_from_str(text).expect("load");
    assert!(config.logging.json);
    assert!(!config.refactor.change_signature.compile_check);
    assert_eq!(
        warnings,
        vec![
            ConfigWarning::UnknownKey {
                path: "colour".to_owned()
            },
            ConfigWarning::UnknownKey {
                path: "refactor.change_signature.ripple".to_owned()
            },
        ]
    );
    assert_eq!(
        warnings[1].to_string(),
        "unknown configuration key `refactor.change_signature.ripple`"
    );
}

#[test]
fn type_errors_are_fatal() {
    let err = JoltConfig::load_from_str("[refactor.change_signature]\nadd_imports = \"yes\"\n")
        .expect_err("a string is not a bool");
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
}

#[test]
fn missing_files_report_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    let err = JoltConfig::load_from_path(&path).expect_err("missing file");
    assert!(err.to_string().contains("absent.toml"), "{err}");
}
