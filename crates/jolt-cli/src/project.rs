use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jolt_config::JoltConfig;
use jolt_core::FileId;
use jolt_index::Workspace;
use walkdir::WalkDir;

/// A source tree loaded from disk, with the configuration that applies to it.
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: JoltConfig,
    pub(crate) workspace: Workspace,
}

impl Project {
    /// Load the configuration (`config` overrides discovery under `root`),
    /// install tracing, then read every `.java` file below `root`.
    pub(crate) fn open(root: &Path, config: Option<&Path>) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("cannot open project root {}", root.display()))?;

        let (config, warnings) = match config {
            Some(path) => JoltConfig::load_from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => {
                let (config, _, warnings) = jolt_config::load_for_workspace(&root)
                    .with_context(|| {
                        format!("failed to load the configuration of {}", root.display())
                    })?;
                (config, warnings)
            }
        };
        jolt_config::init_tracing(&config.logging);
        for warning in &warnings {
            tracing::warn!(target: "jolt.cli", %warning, "configuration");
        }

        let mut files = Vec::new();
        for path in java_files_in(&root) {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            files.push((file_id(&root, &path).0, text));
        }
        tracing::debug!(
            target: "jolt.cli",
            root = %root.display(),
            files = files.len(),
            "loaded project"
        );

        Ok(Self {
            root,
            config,
            workspace: Workspace::from_files(files),
        })
    }

    pub(crate) fn path_of(&self, file: &FileId) -> PathBuf {
        self.root.join(file.as_str())
    }

    /// Write the current workspace text of `files` back to disk.
    pub(crate) fn write_back<'a>(&self, files: impl IntoIterator<Item = &'a FileId>) -> Result<()> {
        for file in files {
            let text = self
                .workspace
                .file_text(file)
                .with_context(|| format!("{file} is not part of the project"))?;
            let path = self.path_of(file);
            fs::write(&path, text.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Workspace-relative id with `/` separators.
fn file_id(root: &Path, path: &Path) -> FileId {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    FileId::new(parts.join("/"))
}

fn java_files_in(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(target: "jolt.cli", error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_java_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files
}

fn is_java_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("java"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_relative_with_forward_slashes() {
        let root = Path::new("/work/project");
        let path = root.join("src").join("p").join("A.java");
        assert_eq!(file_id(root, &path), FileId::new("src/p/A.java"));
    }

    #[test]
    fn open_loads_sources_under_relative_ids() {
        use assert_fs::prelude::*;

        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/p/A.java").write_str("package p;\nclass A {}\n").unwrap();
        temp.child("notes.txt").write_str("ignored").unwrap();

        let project = Project::open(temp.path(), None).unwrap();
        let files: Vec<&FileId> = project.workspace.files().collect();
        assert_eq!(files, vec![&FileId::new("src/p/A.java")]);
        assert_eq!(
            project.workspace.file_text(&FileId::new("src/p/A.java")).as_deref(),
            Some("package p;\nclass A {}\n")
        );
        assert_eq!(project.path_of(files[0]), project.root.join("src/p/A.java"));
    }

    #[test]
    fn only_java_sources_are_loaded() {
        assert!(is_java_file(Path::new("A.java")));
        assert!(is_java_file(Path::new("B.JAVA")));
        assert!(!is_java_file(Path::new("A.class")));
        assert!(!is_java_file(Path::new("jolt.toml")));
    }
}
