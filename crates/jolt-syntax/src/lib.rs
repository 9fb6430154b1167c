//! Lightweight Java syntax layer.
//!
//! The parser is hand written and error tolerant. It covers the parts of Java a
//! signature refactoring has to see (declarations, statements, expressions and
//! doc comment cross references) and gives every node that an edit may target a
//! stable [`ast::NodeId`]. Ids are assigned in source order, so reparsing the same
//! text yields the same ids.

pub mod ast;
mod diagnostic;
mod doc;
mod lexer;
mod names;
mod parser;
pub mod visit;

pub use diagnostic::{Diagnostic, Severity};
pub use names::{is_java_identifier, is_keyword, is_primitive_type};

use ast::{CompilationUnit, Expr, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    unit: CompilationUnit,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    #[must_use]
    pub fn compilation_unit(&self) -> &CompilationUnit {
        &self.unit
    }

    /// Syntax errors found while parsing.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[must_use]
pub fn parse(text: &str) -> Parse {
    let lexed = lexer::tokenize(text);
    let mut parser = parser::Parser::new(text, lexed);
    let unit = parser.parse_compilation_unit();
    let diagnostics = parser.finish();
    tracing::trace!(
        target: "jolt.syntax",
        len = text.len(),
        errors = diagnostics.len(),
        "parsed compilation unit"
    );
    Parse { unit, diagnostics }
}

/// Parse `text` as a standalone type reference such as `java.util.List<String>[]`.
///
/// Returns `None` unless the whole input is consumed by exactly one type.
#[must_use]
pub fn parse_type_fragment(text: &str) -> Option<TypeRef> {
    let lexed = lexer::tokenize(text);
    if !lexed.errors.is_empty() {
        return None;
    }
    let mut parser = parser::Parser::new(text, lexed);
    parser.parse_type_fragment()
}

/// Parse `text` as a standalone expression, e.g. a default value for an added
/// parameter.
///
/// Returns `None` when the input does not form exactly one complete expression.
#[must_use]
pub fn parse_expression_fragment(text: &str) -> Option<Expr> {
    let lexed = lexer::tokenize(text);
    if !lexed.errors.is_empty() {
        return None;
    }
    let mut parser = parser::Parser::new(text, lexed);
    parser.parse_expression_fragment()
}

#[cfg(test)]
mod tests;
