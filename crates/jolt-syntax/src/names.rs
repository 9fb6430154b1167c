//! Identifier and keyword rules from the Java language specification.

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "_",
];

const LITERALS: &[&str] = &["true", "false", "null"];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// Reserved keywords plus the `true`/`false`/`null` literals.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text) || LITERALS.contains(&text)
}

pub fn is_primitive_type(text: &str) -> bool {
    PRIMITIVES.contains(&text)
}

pub(crate) fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_ident::is_xid_start(ch)
}

pub(crate) fn is_ident_continue(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_continue(ch)
}

/// Whether `text` is a legal Java identifier (and not a reserved word).
pub fn is_java_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_ident_start(first) && chars.all(is_ident_continue) && !is_keyword(text)
}
