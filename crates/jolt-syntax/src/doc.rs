//! Cross references inside `/** ... */` comments.
//!
//! Only method references are modelled: `{@link #m(int)}`, `{@linkplain Foo#m}`
//! and `@see Foo#m(String, int)`. Plain type references are skipped.

use jolt_core::TextRange;

use crate::ast::{DocComment, DocMethodRef, DocParam, DocParamList, Name, TypeRef};
use crate::names::{is_ident_continue, is_ident_start};
use crate::parser::Parser;

const TAGS: &[&str] = &["linkplain", "link", "see"];

impl Parser<'_> {
    pub(crate) fn parse_doc_comment(&mut self, range: TextRange) -> DocComment {
        let mut method_refs = Vec::new();
        let source = self.text;
        let text = &source[range.start..range.end];

        let mut refs = Vec::new();
        for (at, _) in text.match_indices('@') {
            let after = &text[at + 1..];
            let Some(tag) = TAGS.iter().find(|tag| {
                after.starts_with(**tag)
                    && !after[tag.len()..].starts_with(|c: char| c.is_ascii_alphanumeric())
            }) else {
                continue;
            };
            let mut pos = at + 1 + tag.len();
            pos += text[pos..].len() - text[pos..].trim_start_matches([' ', '\t']).len();
            refs.push(range.start + pos);
        }

        for offset in refs {
            if let Some(method_ref) = self.parse_doc_method_ref(offset, range.end) {
                method_refs.push(method_ref);
            }
        }

        DocComment { range, method_refs }
    }

    /// `[Qualifier]#name[(params)]` starting at `start`.
    fn parse_doc_method_ref(&mut self, start: usize, limit: usize) -> Option<DocMethodRef> {
        let text = self.text;
        let qualifier_end = scan(text, start, limit, |c| is_ident_continue(c) || c == '.');
        if !text[qualifier_end..limit].starts_with('#') {
            return None;
        }

        let name_start = qualifier_end + 1;
        let name_end = scan(text, name_start, limit, is_ident_continue);
        if name_end == name_start || !text[name_start..].starts_with(is_ident_start) {
            return None;
        }

        let id = self.alloc();
        let qualifier = (qualifier_end > start).then(|| TypeRef {
            id: self.alloc(),
            text: text[start..qualifier_end].to_string(),
            range: TextRange::new(start, qualifier_end),
        });
        let name = Name {
            id: self.alloc(),
            text: text[name_start..name_end].to_string(),
            range: TextRange::new(name_start, name_end),
        };

        let params = if text[name_end..limit].starts_with('(') {
            let close = text[name_end..limit]
                .find(|c| c == ')' || c == '}')
                .map(|rel| name_end + rel)
                .filter(|&close| text[close..].starts_with(')'))?;
            Some(self.parse_doc_params(name_end, close))
        } else {
            None
        };

        let end = params
            .as_ref()
            .map(|list| list.range.end)
            .unwrap_or(name_end);
        Some(DocMethodRef {
            id,
            qualifier,
            name,
            params,
            range: TextRange::new(start, end),
        })
    }

    /// Parameters between the `(` at `open` and the `)` at `close`.
    fn parse_doc_params(&mut self, open: usize, close: usize) -> DocParamList {
        let id = self.alloc();
        let text = self.text;
        let mut params = Vec::new();

        let mut segment_start = open + 1;
        let inner = &text[open + 1..close];
        let mut bounds: Vec<(usize, usize)> = inner
            .match_indices(',')
            .map(|(rel, _)| {
                let end = open + 1 + rel;
                let bound = (segment_start, end);
                segment_start = end + 1;
                bound
            })
            .collect();
        bounds.push((segment_start, close));

        for (seg_start, seg_end) in bounds {
            let segment = &text[seg_start..seg_end];
            let lead = segment.len() - segment.trim_start().len();
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                continue;
            }
            let ty_start = seg_start + lead;
            let ty_len = trimmed
                .find(char::is_whitespace)
                .unwrap_or(trimmed.len());
            let ty_end = ty_start + ty_len;
            let ty = TypeRef {
                id: self.alloc(),
                text: text[ty_start..ty_end].to_string(),
                range: TextRange::new(ty_start, ty_end),
            };

            let rest = &text[ty_end..seg_end];
            let name = {
                let name_lead = rest.len() - rest.trim_start().len();
                let candidate = rest.trim();
                (!candidate.is_empty()).then(|| {
                    let name_start = ty_end + name_lead;
                    Name {
                        id: self.alloc(),
                        text: candidate.to_string(),
                        range: TextRange::new(name_start, name_start + candidate.len()),
                    }
                })
            };

            let end = name.as_ref().map(|name| name.range.end).unwrap_or(ty_end);
            params.push(DocParam {
                id: self.alloc(),
                ty,
                name,
                range: TextRange::new(ty_start, end),
            });
        }

        DocParamList {
            id,
            params,
            range: TextRange::new(open, close + 1),
        }
    }
}

fn scan(text: &str, start: usize, limit: usize, accept: impl Fn(char) -> bool) -> usize {
    text[start..limit]
        .char_indices()
        .find(|(_, c)| !accept(*c))
        .map(|(rel, _)| start + rel)
        .unwrap_or(limit)
}
