use std::collections::{BTreeSet, HashSet};

use jolt_core::{FileId, TextEdit};
use jolt_syntax::ast::{base_type_name, CompilationUnit};
use jolt_syntax::is_primitive_type;

/// Collects the imports needed by types written into one compilation unit.
///
/// [`ImportRewrite::add`] returns the text to write for a type: its simple name
/// when that is unambiguous in the unit (importing it if needed), the qualified
/// name otherwise.
#[derive(Debug, Clone)]
pub(crate) struct ImportRewrite {
    enabled: bool,
    package: String,
    single: Vec<String>,
    on_demand: Vec<String>,
    declared: HashSet<String>,
    added: BTreeSet<String>,
    /// Insertion offset and whether a package clause precedes it.
    anchor: Anchor,
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    AfterImports(usize),
    AfterPackage(usize),
    Start,
}

impl ImportRewrite {
    pub fn new(unit: &CompilationUnit, enabled: bool) -> Self {
        let mut single = Vec::new();
        let mut on_demand = Vec::new();
        for import in unit.imports.iter().filter(|import| !import.is_static) {
            if import.is_star {
                on_demand.push(import.path.clone());
            } else {
                single.push(import.path.clone());
            }
        }
        let anchor = match (unit.imports.last(), &unit.package) {
            (Some(last), _) => Anchor::AfterImports(last.range.end),
            (None, Some(package)) => Anchor::AfterPackage(package.range.end),
            (None, None) => Anchor::Start,
        };
        Self {
            enabled,
            package: unit.package_name().to_string(),
            single,
            on_demand,
            declared: unit.types.iter().map(|decl| decl.name.text.clone()).collect(),
            added: BTreeSet::new(),
            anchor,
        }
    }

    /// Text to write for `ty`, which may carry type arguments, array
    /// dimensions or a varargs marker after the (possibly qualified) name.
    pub fn add(&mut self, ty: &str) -> String {
        let ty = ty.trim();
        let base = base_type_name(ty);
        let suffix = &ty[base.len()..];
        format!("{}{suffix}", self.add_name(base))
    }

    fn add_name(&mut self, qualified: &str) -> String {
        let Some((package, simple)) = qualified.rsplit_once('.') else {
            return qualified.to_string();
        };
        if is_primitive_type(qualified) {
            return qualified.to_string();
        }
        if package == "java.lang" {
            return simple.to_string();
        }
        if !self.enabled {
            return qualified.to_string();
        }

        let clashes_with =
            |path: &String| path.rsplit('.').next() == Some(simple) && path != qualified;
        if self.single.iter().chain(&self.added).any(clashes_with) {
            return qualified.to_string();
        }
        if self.single.iter().chain(&self.added).any(|path| path == qualified) {
            return simple.to_string();
        }
        if self.declared.contains(simple) {
            let own = if self.package.is_empty() {
                simple.to_string()
            } else {
                format!("{}.{simple}", self.package)
            };
            return if own == qualified {
                simple.to_string()
            } else {
                qualified.to_string()
            };
        }
        if package == self.package || self.on_demand.iter().any(|path| path == package) {
            return simple.to_string();
        }

        self.added.insert(qualified.to_string());
        simple.to_string()
    }

    /// The edit that writes the new import declarations, if any.
    pub fn edits(&self, file: &FileId) -> Vec<TextEdit> {
        if self.added.is_empty() {
            return Vec::new();
        }
        let lines: Vec<String> = self.added.iter().map(|path| format!("import {path};")).collect();
        let edit = match self.anchor {
            Anchor::AfterImports(offset) => {
                TextEdit::insert(file.clone(), offset, format!("\n{}", lines.join("\n")))
            }
            Anchor::AfterPackage(offset) => {
                TextEdit::insert(file.clone(), offset, format!("\n\n{}", lines.join("\n")))
            }
            Anchor::Start => TextEdit::insert(file.clone(), 0, format!("{}\n\n", lines.join("\n"))),
        };
        vec![edit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite_for(text: &str) -> ImportRewrite {
        ImportRewrite::new(jolt_syntax::parse(text).compilation_unit(), true)
    }

    #[test]
    fn imports_new_types_once() {
        let mut imports = rewrite_for("package p;\n\nimport java.util.Map;\n\nclass A {}\n");
        assert_eq!(imports.add("java.util.List<String>"), "List<String>");
        assert_eq!(imports.add("java.util.List[]"), "List[]");
        assert_eq!(imports.add("java.util.Map"), "Map");
        let added: Vec<&str> = imports.added.iter().map(String::as_str).collect();
        assert_eq!(added, vec!["java.util.List"]);
    }

    #[test]
    fn skips_java_lang_same_package_and_primitives() {
        let mut imports = rewrite_for("package p;\nclass A {}\n");
        assert_eq!(imports.add("java.lang.String"), "String");
        assert_eq!(imports.add("p.B"), "B");
        assert_eq!(imports.add("int[]"), "int[]");
        assert_eq!(imports.add("T"), "T");
        assert!(imports.edits(&FileId::new("A.java")).is_empty());
    }

    #[test]
    fn clashing_simple_names_stay_qualified() {
        let mut imports = rewrite_for("import java.awt.List;\nclass A {}\n");
        assert_eq!(imports.add("java.util.List"), "java.util.List");
        assert_eq!(imports.add("q.A"), "q.A");
        assert_eq!(imports.add("q.Date"), "Date");
        assert_eq!(imports.add("java.util.Date"), "java.util.Date");
    }

    #[test]
    fn disabled_rewrite_qualifies() {
        let unit = jolt_syntax::parse("class A {}");
        let mut imports = ImportRewrite::new(unit.compilation_unit(), false);
        assert_eq!(imports.add("java.util.List"), "java.util.List");
        assert_eq!(imports.add("java.lang.Integer"), "Integer");
    }

    #[test]
    fn import_edits_follow_the_existing_header() {
        let file = FileId::new("A.java");
        let mut imports = rewrite_for("package p;\nclass A {}\n");
        imports.add("java.util.List");
        imports.add("java.io.File");
        let edits = imports.edits(&file);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range.start, "package p;".len());
        assert_eq!(edits[0].replacement, "\n\nimport java.io.File;\nimport java.util.List;");
    }
}
