use jolt_core::TextRange;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A compiler-style diagnostic.
///
/// `code` is a stable machine readable identifier, `message` is for humans and
/// never contains positions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub range: Option<TextRange>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, range: Option<TextRange>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            range,
        }
    }

    pub fn warning(
        code: &'static str,
        message: impl Into<String>,
        range: Option<TextRange>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            range,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
