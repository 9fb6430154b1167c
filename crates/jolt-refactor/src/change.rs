//! The result of a refactoring: named groups of text edits per file.

use std::collections::BTreeMap;
use std::sync::Arc;

use jolt_core::{apply_text_edits, EditError, FileId, TextEdit, WorkspaceEdit};
use jolt_index::CommitError;

use crate::error::RefactorError;
use crate::preview::{unified_diff, FilePreview};
use crate::semantic::ChangeSink;

/// Parameter list, name, type, visibility and exception edits.
pub const MODIFY_PARAMETERS: &str = "Modify parameters";
/// New import declarations.
pub const ADD_IMPORTS: &str = "Add imports";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditGroup {
    pub name: String,
    pub edits: Vec<TextEdit>,
}

/// All edits to one file, computed against `original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitChange {
    pub file: FileId,
    pub original: Arc<str>,
    pub groups: Vec<EditGroup>,
}

impl UnitChange {
    pub fn group(&self, name: &str) -> Option<&EditGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn edits(&self) -> impl Iterator<Item = &TextEdit> {
        self.groups.iter().flat_map(|group| group.edits.iter())
    }

    pub fn edit_count(&self) -> usize {
        self.groups.iter().map(|group| group.edits.len()).sum()
    }

    /// The file text with every group applied.
    pub fn preview(&self) -> Result<String, EditError> {
        let edits: Vec<TextEdit> = self.edits().cloned().collect();
        apply_text_edits(&self.original, &edits)
    }

    /// The file text with only the group `name` applied.
    pub fn group_preview(&self, name: &str) -> Result<String, EditError> {
        match self.group(name) {
            Some(group) => apply_text_edits(&self.original, &group.edits),
            None => Ok(self.original.to_string()),
        }
    }
}

/// A set of per-file changes that is applied all at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Change {
    pub name: String,
    units: BTreeMap<FileId, UnitChange>,
}

impl Change {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: BTreeMap::new(),
        }
    }

    /// Record `edits` under the group `name` for `file`. Empty groups are dropped.
    pub(crate) fn add_group(
        &mut self,
        file: &FileId,
        original: &Arc<str>,
        name: &str,
        edits: Vec<TextEdit>,
    ) {
        if edits.is_empty() {
            return;
        }
        let unit = self.units.entry(file.clone()).or_insert_with(|| UnitChange {
            file: file.clone(),
            original: original.clone(),
            groups: Vec::new(),
        });
        match unit.groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.edits.extend(edits),
            None => unit.groups.push(EditGroup {
                name: name.to_string(),
                edits,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileId> {
        self.units.keys()
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitChange> {
        self.units.values()
    }

    pub fn unit(&self, file: &FileId) -> Option<&UnitChange> {
        self.units.get(file)
    }

    pub fn edit_count(&self) -> usize {
        self.units.values().map(UnitChange::edit_count).sum()
    }

    fn unit_or_err(&self, file: &FileId) -> Result<&UnitChange, RefactorError> {
        self.units
            .get(file)
            .ok_or_else(|| RefactorError::FileNotInChange(file.clone()))
    }

    pub fn preview(&self, file: &FileId) -> Result<String, RefactorError> {
        Ok(self.unit_or_err(file)?.preview()?)
    }

    pub fn group_preview(&self, file: &FileId, group: &str) -> Result<String, RefactorError> {
        Ok(self.unit_or_err(file)?.group_preview(group)?)
    }

    pub fn unified_diff(&self, file: &FileId) -> Result<String, RefactorError> {
        let unit = self.unit_or_err(file)?;
        let modified = unit.preview()?;
        Ok(unified_diff(file, &unit.original, &modified))
    }

    /// One preview per changed file, in path order.
    pub fn previews(&self) -> Result<Vec<FilePreview>, RefactorError> {
        self.units
            .values()
            .map(|unit| {
                let modified = unit.preview()?;
                Ok(FilePreview {
                    file: unit.file.clone(),
                    unified_diff: unified_diff(&unit.file, &unit.original, &modified),
                    original: unit.original.to_string(),
                    modified,
                    edit_count: unit.edit_count(),
                })
            })
            .collect()
    }

    pub fn to_workspace_edit(&self) -> Result<WorkspaceEdit, EditError> {
        let edits = self
            .units
            .values()
            .flat_map(|unit| unit.edits().cloned())
            .collect();
        let mut edit = WorkspaceEdit::new(edits);
        edit.normalize()?;
        Ok(edit)
    }

    /// Apply the change through `sink`.
    ///
    /// Every file is validated first: its edits must apply cleanly, the file
    /// must be writable and still hold the text the change was computed
    /// against. Nothing reaches the sink unless all files pass.
    pub fn commit(&self, sink: &mut dyn ChangeSink) -> Result<(), RefactorError> {
        for unit in self.units.values() {
            unit.preview()?;
            if !sink.is_writable(&unit.file) {
                return Err(CommitError::ReadOnly(unit.file.clone()).into());
            }
            match sink.text(&unit.file) {
                Some(current) if *current == *unit.original => {}
                Some(_) => return Err(RefactorError::FileChanged(unit.file.clone())),
                None => return Err(CommitError::UnknownFile(unit.file.clone()).into()),
            }
        }

        let edit = self.to_workspace_edit()?;
        tracing::info!(
            target: "jolt.refactor",
            change = %self.name,
            files = self.units.len(),
            edits = edit.edits.len(),
            "committing change"
        );
        sink.commit(&edit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_core::TextRange;
    use jolt_index::Workspace;
    use pretty_assertions::assert_eq;

    fn sample() -> (Change, FileId) {
        let file = FileId::new("A.java");
        let original: Arc<str> = Arc::from("class A { void m() {} }");
        let mut change = Change::new("Change signature");
        change.add_group(
            &file,
            &original,
            MODIFY_PARAMETERS,
            vec![TextEdit::replace(file.clone(), TextRange::new(15, 16), "n")],
        );
        change.add_group(
            &file,
            &original,
            ADD_IMPORTS,
            vec![TextEdit::insert(file.clone(), 0, "import x.Y;\n")],
        );
        change.add_group(&file, &original, ADD_IMPORTS, Vec::new());
        (change, file)
    }

    #[test]
    fn groups_preview_separately() {
        let (change, file) = sample();
        assert_eq!(change.edit_count(), 2);
        assert_eq!(change.preview(&file).unwrap(), "import x.Y;\nclass A { void n() {} }");
        assert_eq!(
            change.group_preview(&file, MODIFY_PARAMETERS).unwrap(),
            "class A { void n() {} }"
        );
        assert_eq!(
            change.group_preview(&file, ADD_IMPORTS).unwrap(),
            "import x.Y;\nclass A { void m() {} }"
        );
        assert_eq!(
            change.preview(&FileId::new("B.java")),
            Err(RefactorError::FileNotInChange(FileId::new("B.java")))
        );
    }

    #[test]
    fn commit_refuses_files_that_changed() {
        let (change, file) = sample();
        let mut workspace = Workspace::from_files([("A.java", "class A { void m() { } }")]);
        assert_eq!(change.commit(&mut workspace), Err(RefactorError::FileChanged(file.clone())));

        let mut workspace = Workspace::from_files([("A.java", "class A { void m() {} }")]);
        change.commit(&mut workspace).unwrap();
        assert_eq!(
            workspace.file_text(&file).as_deref(),
            Some("import x.Y;\nclass A { void n() {} }")
        );
    }
}
