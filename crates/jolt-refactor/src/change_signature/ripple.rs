//! Giving a no-argument constructor new parameters breaks every subclass that
//! calls it implicitly. Those subclasses get explicit `super(..)` calls, and
//! a constructor of their own when they declare none.

use std::collections::BTreeMap;

use jolt_core::{FileId, TextRange};
use jolt_index::TypeId;
use jolt_syntax::ast::{TypeDecl, Visibility};

use super::occurrence::Target;
use crate::rewrite::{Piece, SourceRewrite};

/// Source subclasses of the constructor's type, grouped per file. Empty
/// unless the target is a no-argument constructor that gains parameters.
pub(super) fn subclasses_to_update(target: &Target<'_>) -> BTreeMap<FileId, Vec<TypeId>> {
    let mut out: BTreeMap<FileId, Vec<TypeId>> = BTreeMap::new();
    let method = target.method;
    if !target.options.ripple_constructors
        || !method.is_constructor
        || method.arity() != 0
        || target.state.new_parameters().next().is_none()
    {
        return out;
    }
    for ty in target.db.subclasses(method.declaring_type) {
        if let Some(file) = target.db.type_info(ty).origin.file() {
            out.entry(file.clone()).or_default().push(ty);
        }
    }
    tracing::debug!(
        target: "jolt.refactor",
        subclasses = out.values().map(Vec::len).sum::<usize>(),
        "constructor ripple"
    );
    out
}

/// The argument list the rippled `super(..)` calls pass.
pub(super) fn super_arguments(target: &Target<'_>) -> String {
    target
        .state
        .new_parameters()
        .map(|info| info.default_value())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(text: &str, offset: usize) -> &str {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |newline| newline + 1);
    let line = &text[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Put `lines` (each ending in a newline) first inside the braces `braces`.
/// An empty block is rewritten so its closing brace lands on its own line
/// at `closing_indent`.
fn insert_first(
    rewrite: &mut SourceRewrite,
    text: &str,
    braces: TextRange,
    lines: &str,
    closing_indent: &str,
) {
    let bytes = text.as_bytes();
    if braces.len() < 2
        || bytes.get(braces.start) != Some(&b'{')
        || bytes.get(braces.end - 1) != Some(&b'}')
    {
        return;
    }
    let inner = TextRange::new(braces.start + 1, braces.end - 1);
    if text[inner.start..inner.end].trim().is_empty() {
        rewrite.replace_range(inner, vec![Piece::Text(format!("\n{lines}{closing_indent}"))]);
    } else {
        rewrite.insert(inner.start, format!("\n{}", lines.trim_end_matches('\n')));
    }
}

pub(super) fn add_super_calls(
    rewrite: &mut SourceRewrite,
    text: &str,
    decl: &TypeDecl,
    access: Visibility,
    arguments: &str,
) {
    let class_indent = line_indent(text, decl.name.range.start);
    let mut constructors = decl.constructors().peekable();

    if constructors.peek().is_none() {
        let indent = format!("{class_indent}    ");
        let keyword = access.keyword().map(|keyword| format!("{keyword} ")).unwrap_or_default();
        let constructor = format!(
            "{indent}{keyword}{name}() {{\n{indent}    super({arguments});\n{indent}}}\n",
            name = decl.name.text
        );
        insert_first(rewrite, text, decl.body.range, &constructor, class_indent);
        return;
    }

    for constructor in constructors {
        if constructor.explicit_constructor_call().is_some() {
            continue;
        }
        let Some(body) = &constructor.body else {
            continue;
        };
        let indent = line_indent(text, constructor.name.range.start);
        let call = format!("{indent}    super({arguments});\n");
        insert_first(rewrite, text, body.range, &call, indent);
    }
}
