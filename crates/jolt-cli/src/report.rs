//! What the commands print, as plain text or JSON.

use anyhow::Result;
use jolt_core::{FileId, LineIndex, TextRange};
use jolt_index::Workspace;
use jolt_refactor::{Change, Problem, RefactoringStatus, Severity};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct Location {
    pub file: FileId,
    /// One-based.
    pub line: u32,
    /// One-based.
    pub column: u32,
}

impl Location {
    fn at(file: &FileId, text: &str, range: TextRange) -> Self {
        let position = LineIndex::new(text).line_col(range.start);
        Self {
            file: file.clone(),
            line: position.line + 1,
            column: position.col + 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EntryReport {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// The method to run the refactoring on instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileReport {
    pub file: FileId,
    pub edits: usize,
    pub diff: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeSignatureReport {
    pub method: String,
    pub signature: String,
    pub severity: Option<Severity>,
    pub cancelled: bool,
    pub entries: Vec<EntryReport>,
    pub files: Vec<FileReport>,
    pub applied: bool,
}

impl ChangeSignatureReport {
    pub(crate) fn new(
        workspace: &Workspace,
        method: String,
        signature: String,
        status: &RefactoringStatus,
        change: Option<&Change>,
    ) -> Result<Self> {
        let entries = status
            .entries()
            .iter()
            .map(|entry| EntryReport {
                severity: entry.severity,
                message: entry.message(),
                location: entry.context.as_ref().and_then(|context| {
                    let range = context.range?;
                    // Compile errors point into the changed text.
                    let text = match (&entry.problem, change) {
                        (Problem::CompileError { .. }, Some(change)) => {
                            change.preview(&context.file).ok()?
                        }
                        _ => workspace.file_text(&context.file)?.to_string(),
                    };
                    Some(Location::at(&context.file, &text, range))
                }),
                alternate: entry.alternate.map(|id| workspace.model().method_label(id)),
            })
            .collect();

        let files = match change {
            Some(change) => change
                .previews()?
                .into_iter()
                .map(|preview| FileReport {
                    file: preview.file,
                    edits: preview.edit_count,
                    diff: preview.unified_diff,
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            method,
            signature,
            severity: status.severity(),
            cancelled: status.was_cancelled(),
            entries,
            files,
            applied: false,
        })
    }

    pub(crate) fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        println!("{} -> {}", self.method, self.signature);
        for entry in &self.entries {
            match &entry.location {
                Some(location) => println!(
                    "{}:{}:{}: {}: {}",
                    location.file, location.line, location.column, entry.severity, entry.message
                ),
                None => println!("{}: {}", entry.severity, entry.message),
            }
            if let Some(alternate) = &entry.alternate {
                println!("  try: {alternate}");
            }
        }
        if self.cancelled {
            println!("cancelled: the change is incomplete");
        }
        for file in &self.files {
            print!("{}", file.diff);
        }
        let edits: usize = self.files.iter().map(|file| file.edits).sum();
        let verb = if self.applied { "applied" } else { "would change" };
        println!("summary: {verb} {} file(s), {edits} edit(s)", self.files.len());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DiagnosticReport {
    pub severity: jolt_syntax::Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<DiagnosticReport>,
}

impl CheckReport {
    pub(crate) fn new(workspace: &Workspace) -> Self {
        let mut diagnostics = Vec::new();
        let mut files = 0;
        for file in workspace.files() {
            files += 1;
            let text = workspace
                .file_text(file)
                .map(|text| text.to_string())
                .unwrap_or_default();
            for diagnostic in workspace.diagnostics(file) {
                let location = diagnostic.range.map(|range| Location::at(file, &text, range));
                diagnostics.push(DiagnosticReport {
                    severity: diagnostic.severity,
                    code: diagnostic.code,
                    message: diagnostic.message,
                    file: location.is_none().then(|| file.clone()),
                    location,
                });
            }
        }
        let errors = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == jolt_syntax::Severity::Error)
            .count();
        let warnings = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == jolt_syntax::Severity::Warning)
            .count();
        Self {
            files,
            errors,
            warnings,
            diagnostics,
        }
    }

    pub(crate) fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        for diagnostic in &self.diagnostics {
            let severity = match diagnostic.severity {
                jolt_syntax::Severity::Error => "error",
                jolt_syntax::Severity::Warning => "warning",
                jolt_syntax::Severity::Info => "info",
            };
            match (&diagnostic.location, &diagnostic.file) {
                (Some(location), _) => {
                    print!("{}:{}:{}: ", location.file, location.line, location.column)
                }
                (None, Some(file)) => print!("{file}: "),
                (None, None) => {}
            }
            println!("{severity}[{}] {}", diagnostic.code, diagnostic.message);
        }
        println!(
            "summary: {} file(s), {} error(s), {} warning(s)",
            self.files, self.errors, self.warnings
        );
        Ok(())
    }
}
