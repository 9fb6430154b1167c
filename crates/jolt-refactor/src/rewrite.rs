//! A pending-edit overlay over one source text.
//!
//! Edits are recorded against original ranges and only turned into text at the
//! end. A list rewrite refers to its elements by original range, and rendering
//! such a copy applies whatever edits are pending inside that range at render
//! time. That way a parameter renamed by one pass and moved by a later
//! reshuffle comes out both renamed and moved, whatever order the passes ran
//! in.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use jolt_core::{FileId, TextEdit, TextRange};
use jolt_syntax::ast::{ArgList, DocParamList, NodeId, ParamList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    /// Original text of the range with the edits pending inside it.
    Copy(TextRange),
}

#[derive(Debug, Clone)]
struct Op {
    range: TextRange,
    pieces: Vec<Piece>,
    list: bool,
}

/// An element of a rewritten list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The element that was at this index in the original list.
    Existing(usize),
    New(String),
}

/// A comma separated list between two delimiters: call arguments, declared
/// parameters, or the parameters of a doc reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListShape {
    pub id: NodeId,
    /// Offset right after the opening delimiter.
    pub open: usize,
    /// Offset of the closing delimiter.
    pub close: usize,
    pub elements: Vec<TextRange>,
}

impl ListShape {
    /// `arity` and `varargs` describe the called method: the trailing variable
    /// arguments are treated as one element.
    pub fn arguments(args: &ArgList, arity: usize, varargs: bool) -> Self {
        let mut elements: Vec<TextRange> = args.args.iter().map(|arg| arg.range()).collect();
        if varargs && arity > 0 && elements.len() > arity {
            let tail = elements.split_off(arity - 1);
            if let Some(covered) = tail.into_iter().reduce(TextRange::cover) {
                elements.push(covered);
            }
        }
        Self::delimited(args.id, args.range, elements)
    }

    pub fn parameters(params: &ParamList) -> Self {
        let elements = params.params.iter().map(|param| param.range).collect();
        Self::delimited(params.id, params.range, elements)
    }

    pub fn doc_parameters(params: &DocParamList) -> Self {
        let elements = params.params.iter().map(|param| param.range).collect();
        Self::delimited(params.id, params.range, elements)
    }

    fn delimited(id: NodeId, range: TextRange, elements: Vec<TextRange>) -> Self {
        Self {
            id,
            open: (range.start + 1).min(range.end),
            close: range.end.saturating_sub(1).max(range.start),
            elements,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SourceRewrite {
    file: FileId,
    text: Arc<str>,
    ops: Vec<Op>,
    nodes: HashMap<NodeId, usize>,
}

impl SourceRewrite {
    pub fn new(file: FileId, text: Arc<str>) -> Self {
        Self {
            file,
            text,
            ops: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    fn record(&mut self, node: Option<NodeId>, op: Op) {
        match node.and_then(|node| self.nodes.get(&node).copied()) {
            Some(index) => self.ops[index] = op,
            None => {
                self.ops.push(op);
                if let Some(node) = node {
                    self.nodes.insert(node, self.ops.len() - 1);
                }
            }
        }
    }

    /// Replace the text of `node`. A second replacement of the same node wins.
    pub fn replace(&mut self, node: NodeId, range: TextRange, text: impl Into<String>) {
        self.record(
            Some(node),
            Op {
                range,
                pieces: vec![Piece::Text(text.into())],
                list: false,
            },
        );
    }

    pub fn replace_range(&mut self, range: TextRange, pieces: Vec<Piece>) {
        self.record(
            None,
            Op {
                range,
                pieces,
                list: false,
            },
        );
    }

    pub fn remove(&mut self, range: TextRange) {
        self.replace_range(range, Vec::new());
    }

    /// Inserts at the same offset keep their order.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace_range(TextRange::empty(offset), vec![Piece::Text(text.into())]);
    }

    /// Rewrite `list` so that it holds `slots`. Existing elements are copied
    /// with their pending edits; separators of the original list are reused
    /// where there was one.
    pub fn rewrite_list(&mut self, list: &ListShape, slots: &[Slot]) {
        let unchanged = slots.len() == list.elements.len()
            && slots
                .iter()
                .enumerate()
                .all(|(index, slot)| *slot == Slot::Existing(index));
        if unchanged {
            return;
        }

        let range = match (list.elements.first(), list.elements.last()) {
            (Some(first), Some(last)) => TextRange::new(first.start, last.end),
            _ => TextRange::new(list.open, list.close),
        };

        let mut pieces = Vec::with_capacity(slots.len() * 2);
        for (index, slot) in slots.iter().enumerate() {
            if index > 0 {
                let separator = match (list.elements.get(index - 1), list.elements.get(index)) {
                    (Some(prev), Some(next)) => {
                        self.slice(TextRange::new(prev.end, next.start)).to_string()
                    }
                    _ => ", ".to_string(),
                };
                pieces.push(Piece::Text(separator));
            }
            match slot {
                Slot::Existing(old) => match list.elements.get(*old) {
                    Some(element) => pieces.push(Piece::Copy(*element)),
                    None => continue,
                },
                Slot::New(text) => pieces.push(Piece::Text(text.clone())),
            }
        }

        self.record(
            Some(list.id),
            Op {
                range,
                pieces,
                list: true,
            },
        );
    }

    fn slice(&self, range: TextRange) -> &str {
        self.text.get(range.start..range.end).unwrap_or("")
    }

    /// Top-level ops inside `range`, in application order. Ops nested in a
    /// taken replacement are left to that replacement's copies.
    fn outermost(&self, range: TextRange, exclude: Option<usize>) -> Vec<usize> {
        let mut candidates: Vec<usize> = (0..self.ops.len())
            .filter(|&index| Some(index) != exclude && range.covers(self.ops[index].range))
            .collect();
        candidates.sort_by_key(|&index| {
            let op = &self.ops[index];
            (
                op.range.start,
                !op.range.is_empty(),
                Reverse(op.range.end),
                !op.list,
                index,
            )
        });

        let mut cursor = range.start;
        let mut taken = Vec::new();
        for index in candidates {
            let op = &self.ops[index];
            if op.range.start < cursor {
                continue;
            }
            cursor = op.range.end;
            taken.push(index);
        }
        taken
    }

    fn render_range(&self, range: TextRange, exclude: Option<usize>) -> String {
        let mut out = String::new();
        let mut cursor = range.start;
        for index in self.outermost(range, exclude) {
            let op = &self.ops[index];
            out.push_str(self.slice(TextRange::new(cursor, op.range.start)));
            out.push_str(&self.render_op(index));
            cursor = op.range.end;
        }
        out.push_str(self.slice(TextRange::new(cursor, range.end)));
        out
    }

    fn render_op(&self, index: usize) -> String {
        self.ops[index]
            .pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.clone(),
                Piece::Copy(range) => self.render_range(*range, Some(index)),
            })
            .collect()
    }

    /// Non-overlapping edits against the original text, in source order.
    pub fn edits(&self) -> Vec<TextEdit> {
        let everything = TextRange::new(0, self.text.len());
        self.outermost(everything, None)
            .into_iter()
            .filter_map(|index| {
                let range = self.ops[index].range;
                let replacement = self.render_op(index);
                (replacement != self.slice(range))
                    .then(|| TextEdit::replace(self.file.clone(), range, replacement))
            })
            .collect()
    }
}
