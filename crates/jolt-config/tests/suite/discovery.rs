use jolt_config::{discover_config_path, load_for_workspace, JoltConfig};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn discovers_jolt_toml_in_the_root() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("jolt.toml");
    std::fs::write(&path, "[refactor.change_signature]\nadd_imports = false\n").expect("write");

    assert_eq!(discover_config_path(dir.path()), Some(path.clone()));

    let (config, found, warnings) = load_for_workspace(dir.path()).expect("load");
    assert_eq!(found, Some(path));
    assert!(warnings.is_empty());
    assert!(!config.refactor.change_signature.add_imports);
    assert!(config.refactor.change_signature.compile_check);
}

#[test]
fn falls_back_to_the_dot_jolt_directory() {
    let dir = tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join(".jolt")).expect("mkdir");
    let path = dir.path().join(".jolt").join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").expect("write");

    assert_eq!(discover_config_path(dir.path()), Some(path));
    let (config, _, _) = load_for_workspace(dir.path()).expect("load");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn root_file_wins_over_the_dot_jolt_directory() {
    let dir = tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join(".jolt")).expect("mkdir");
    std::fs::write(dir.path().join(".jolt").join("config.toml"), "").expect("write");
    std::fs::write(dir.path().join("jolt.toml"), "").expect("write");

    assert_eq!(discover_config_path(dir.path()), Some(dir.path().join("jolt.toml")));
}

#[test]
fn missing_config_yields_defaults() {
    let dir = tempdir().expect("tempdir");
    assert_eq!(discover_config_path(dir.path()), None);

    let (config, found, warnings) = load_for_workspace(dir.path()).expect("load");
    assert_eq!(config, JoltConfig::default());
    assert_eq!(found, None);
    assert!(warnings.is_empty());
}

#[test]
fn relative_log_files_resolve_against_the_config_directory() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("jolt.toml");
    std::fs::write(&path, "[logging]\nfile = \"logs/jolt.log\"\n").expect("write");

    let (config, _) = JoltConfig::load_from_path(&path).expect("load");
    assert_eq!(config.logging.file, Some(dir.path().join("logs/jolt.log")));
}
