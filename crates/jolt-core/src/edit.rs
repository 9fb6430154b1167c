use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for a source file in a workspace.
///
/// Paths are kept as workspace-relative strings with `/` separators.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A half-open text range `[start, end)` in UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid range: {start}..{end}");
        Self { start, end }
    }

    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether `other` lies completely inside `self` (boundaries included).
    pub fn covers(self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn cover(self, other: TextRange) -> TextRange {
        TextRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A single file edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub file: FileId,
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(file: FileId, offset: usize, text: impl Into<String>) -> Self {
        Self {
            file,
            range: TextRange::empty(offset),
            replacement: text.into(),
        }
    }

    pub fn replace(file: FileId, range: TextRange, text: impl Into<String>) -> Self {
        Self {
            file,
            range,
            replacement: text.into(),
        }
    }

    pub fn delete(file: FileId, range: TextRange) -> Self {
        Self {
            file,
            range,
            replacement: String::new(),
        }
    }
}

/// A set of edits across potentially multiple files.
///
/// The edits are expected to be normalized (sorted, deduplicated, non-overlapping)
/// before being applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    pub edits: Vec<TextEdit>,
}

impl WorkspaceEdit {
    pub fn new(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns edits grouped by file in deterministic order.
    ///
    /// Within a file, edits keep their relative order for equal ranges.
    pub fn edits_by_file(&self) -> BTreeMap<&FileId, Vec<&TextEdit>> {
        let mut map: BTreeMap<&FileId, Vec<&TextEdit>> = BTreeMap::new();
        for edit in &self.edits {
            map.entry(&edit.file).or_default().push(edit);
        }
        for edits in map.values_mut() {
            edits.sort_by_key(|edit| (edit.range.start, edit.range.end));
        }
        map
    }

    /// Normalize edits (sort, deduplicate, and validate non-overlap).
    ///
    /// Inserts at the same offset are merged in the order they were added.
    pub fn normalize(&mut self) -> Result<(), EditError> {
        self.edits
            .sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.range.cmp(&b.range)));

        let mut merged: Vec<TextEdit> = Vec::with_capacity(self.edits.len());
        for edit in self.edits.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.file == edit.file && last.range == edit.range {
                    if last.range.is_empty() {
                        last.replacement.push_str(&edit.replacement);
                        continue;
                    }
                    if last.replacement == edit.replacement {
                        continue;
                    }
                    return Err(EditError::OverlappingEdits {
                        file: edit.file,
                        first: last.range,
                        second: edit.range,
                    });
                }
            }
            merged.push(edit);
        }
        self.edits = merged;

        let mut prev: Option<(&FileId, TextRange)> = None;
        for edit in &self.edits {
            if let Some((file, range)) = prev {
                if file == &edit.file && edit.range.start < range.end {
                    return Err(EditError::OverlappingEdits {
                        file: edit.file.clone(),
                        first: range,
                        second: edit.range,
                    });
                }
            }
            prev = Some((&edit.file, edit.range));
        }

        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid text range {range:?} in {file}")]
    InvalidRange { file: FileId, range: TextRange },
    #[error("overlapping edits in {file}: {first:?} overlaps {second:?}")]
    OverlappingEdits {
        file: FileId,
        first: TextRange,
        second: TextRange,
    },
    #[error("text edit range {range:?} is outside the file bounds (len={len}) in {file}")]
    OutOfBounds {
        file: FileId,
        range: TextRange,
        len: usize,
    },
}

/// Apply a set of edits to `original` and return the modified text.
///
/// Edits are applied in offset order. Inserts at the same offset keep the order in
/// which they appear in `edits`; an insert at the start of a replaced range lands in
/// front of the replacement.
pub fn apply_text_edits(original: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(original.to_string());
    }

    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut out = String::with_capacity(original.len());
    let mut cursor = 0usize;
    for edit in sorted {
        let range = edit.range;
        if range.end > original.len()
            || !original.is_char_boundary(range.start)
            || !original.is_char_boundary(range.end)
        {
            return Err(EditError::OutOfBounds {
                file: edit.file.clone(),
                range,
                len: original.len(),
            });
        }
        if range.start < cursor {
            return Err(EditError::OverlappingEdits {
                file: edit.file.clone(),
                first: TextRange::new(range.start.min(cursor), cursor),
                second: range,
            });
        }
        out.push_str(&original[cursor..range.start]);
        out.push_str(&edit.replacement);
        cursor = range.end;
    }
    out.push_str(&original[cursor..]);

    Ok(out)
}
