use std::collections::{HashMap, HashSet, VecDeque};

use jolt_core::FileId;
use jolt_syntax::ast::{ImportDecl, NodeId, TypeKind, Visibility};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodId(pub u32);

/// Where a type or method was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// `node` is the `TypeDecl`, `MethodDecl`, or for anonymous classes the
    /// `NewExpr` / `EnumConstant` that carries the body.
    Source { file: FileId, node: NodeId },
    /// JDK stub.
    Library,
}

impl Origin {
    pub fn file(&self) -> Option<&FileId> {
        match self {
            Origin::Source { file, .. } => Some(file),
            Origin::Library => None,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Origin::Source { node, .. } => Some(*node),
            Origin::Library => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Origin::Source { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub id: TypeId,
    /// Simple name; empty for anonymous classes.
    pub name: String,
    /// Dotted name, `p.Outer.Inner`. Local and anonymous classes only carry
    /// their simple name here and are not reachable by qualified lookup.
    pub qualified_name: String,
    pub package: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_local: bool,
    pub origin: Origin,
    /// Declaring compilation unit, JDK stub units included.
    pub file: FileId,
    pub outer: Option<TypeId>,
    /// Source text of `new Foo() { .. }`'s `Foo` for anonymous classes.
    pub anonymous_base: Option<String>,
    pub super_class: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub type_params: Vec<String>,
    pub methods: Vec<MethodId>,
    pub fields: Vec<FieldInfo>,
    pub nested: Vec<TypeId>,
    /// A written supertype could not be resolved.
    pub incomplete_hierarchy: bool,
}

impl TypeInfo {
    pub fn is_anonymous(&self) -> bool {
        self.anonymous_base.is_some()
    }

    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub id: MethodId,
    pub name: String,
    pub declaring_type: TypeId,
    pub is_constructor: bool,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_native: bool,
    pub type_params: Vec<String>,
    pub param_names: Vec<String>,
    /// Declared parameter types as written, varargs as `T...`.
    pub param_types: Vec<String>,
    /// Erased, qualified parameter types used to match overrides. Type
    /// variables erase to `*`.
    pub param_keys: Vec<String>,
    pub return_type: Option<String>,
    pub throws: Vec<String>,
    pub varargs: bool,
    pub origin: Origin,
}

impl MethodInfo {
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Participates in dynamic dispatch.
    pub fn is_virtual(&self) -> bool {
        !self.is_constructor && !self.is_static && self.visibility != Visibility::Private
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.varargs {
            count + 1 >= self.arity()
        } else {
            count == self.arity()
        }
    }
}

/// Package and imports of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScope {
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub top_level: Vec<TypeId>,
}

impl FileScope {
    pub fn has_static_imports(&self) -> bool {
        self.imports.iter().any(|import| import.is_static)
    }
}

/// Declared types and methods of the whole workspace, JDK stubs included.
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) types: Vec<TypeInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) by_qualified: HashMap<String, TypeId>,
    pub(crate) scopes: HashMap<FileId, FileScope>,
    pub(crate) node_methods: HashMap<FileId, HashMap<NodeId, MethodId>>,
    pub(crate) node_types: HashMap<FileId, HashMap<NodeId, TypeId>>,
}

impl Model {
    pub fn type_info(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &MethodInfo {
        &self.methods[id.0 as usize]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter()
    }

    pub fn type_by_qualified_name(&self, name: &str) -> Option<TypeId> {
        self.by_qualified.get(name).copied()
    }

    pub fn file_scope(&self, file: &FileId) -> Option<&FileScope> {
        self.scopes.get(file)
    }

    pub fn object_type(&self) -> Option<TypeId> {
        self.type_by_qualified_name("java.lang.Object")
    }

    /// Human readable type name used in messages.
    pub fn type_name(&self, id: TypeId) -> String {
        let info = self.type_info(id);
        match &info.anonymous_base {
            Some(base) => format!("anonymous subclass of '{base}'"),
            None => info.qualified_name.clone(),
        }
    }

    /// `Type.name(T1, T2)`.
    pub fn method_label(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!(
            "{}.{}({})",
            self.type_name(method.declaring_type),
            method.name,
            method.param_types.join(", ")
        )
    }

    /// Direct supertypes, super class first.
    pub fn direct_supertypes(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let info = self.type_info(id);
        info.super_class.into_iter().chain(info.interfaces.iter().copied())
    }

    /// `id` followed by every transitive supertype, breadth first, without
    /// duplicates.
    pub fn supertypes_and_self(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.direct_supertypes(next));
        }
        out
    }

    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        sub == sup || self.supertypes_and_self(sub).contains(&sup)
    }

    /// Types whose super class or one of whose interfaces is `id`.
    pub fn direct_subtypes(&self, id: TypeId) -> Vec<TypeId> {
        self.types
            .iter()
            .filter(|info| info.super_class == Some(id) || info.interfaces.contains(&id))
            .map(|info| info.id)
            .collect()
    }

    /// Every transitive subtype of `id`, excluding `id`.
    pub fn all_subtypes(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(next) = queue.pop_front() {
            for sub in self.direct_subtypes(next) {
                if seen.insert(sub) {
                    out.push(sub);
                    queue.push_back(sub);
                }
            }
        }
        out
    }

    /// Whether every supertype of `id` is declared in source or is
    /// `java.lang.Object`, i.e. member lookups on it are exhaustive.
    pub fn hierarchy_is_known(&self, id: TypeId) -> bool {
        let object = self.object_type();
        self.supertypes_and_self(id).into_iter().all(|ty| {
            let info = self.type_info(ty);
            Some(ty) == object || (info.origin.is_source() && !info.incomplete_hierarchy)
        })
    }

    /// Methods named `name` visible as members of `id`: declared ones first,
    /// then inherited ones, skipping inherited methods hidden by an override.
    pub fn member_methods(&self, id: TypeId, name: &str) -> Vec<MethodId> {
        let mut out: Vec<MethodId> = Vec::new();
        for ty in self.supertypes_and_self(id) {
            for &method in &self.type_info(ty).methods {
                let info = self.method(method);
                if info.name != name || info.is_constructor {
                    continue;
                }
                let hidden = out.iter().any(|&seen| {
                    let seen = self.method(seen);
                    keys_match(&seen.param_keys, &info.param_keys)
                });
                if !hidden {
                    out.push(method);
                }
            }
        }
        out
    }

    pub fn constructors(&self, id: TypeId) -> Vec<MethodId> {
        self.type_info(id)
            .methods
            .iter()
            .copied()
            .filter(|&method| self.method(method).is_constructor)
            .collect()
    }

    /// Field type text and the type it is declared in.
    pub fn find_field(&self, id: TypeId, name: &str) -> Option<(TypeId, &FieldInfo)> {
        self.supertypes_and_self(id).into_iter().find_map(|ty| {
            self.type_info(ty)
                .fields
                .iter()
                .find(|field| field.name == name)
                .map(|field| (ty, field))
        })
    }

    /// Member type named `name` of `id` or one of its supertypes.
    pub fn member_type(&self, id: TypeId, name: &str) -> Option<TypeId> {
        self.supertypes_and_self(id).into_iter().find_map(|ty| {
            self.type_info(ty)
                .nested
                .iter()
                .copied()
                .find(|&nested| self.type_info(nested).name == name)
        })
    }

    /// Enclosing chain starting at `id` itself.
    pub fn enclosing_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut out = vec![id];
        let mut current = self.type_info(id).outer;
        while let Some(outer) = current {
            out.push(outer);
            current = self.type_info(outer).outer;
        }
        out
    }

    pub fn method_by_node(&self, file: &FileId, node: NodeId) -> Option<MethodId> {
        self.node_methods.get(file)?.get(&node).copied()
    }

    /// The type declared by a `TypeDecl`, or the anonymous class carried by a
    /// `NewExpr` / `EnumConstant`.
    pub fn type_by_node(&self, file: &FileId, node: NodeId) -> Option<TypeId> {
        self.node_types.get(file)?.get(&node).copied()
    }
}

/// Erased parameter lists match, with `*` (a type variable) matching anything.
pub fn keys_match(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            if x == y {
                return true;
            }
            let (x_base, x_dims) = erased_dims(x);
            let (y_base, y_dims) = erased_dims(y);
            x_dims == y_dims && (x_base == "*" || y_base == "*")
        })
}

fn erased_dims(key: &str) -> (&str, usize) {
    let base = key.trim_end_matches("[]");
    (base, (key.len() - base.len()) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_variables_match_any_erasure_with_equal_dims() {
        let keys = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(keys_match(&keys(&["*", "int"]), &keys(&["java.lang.String", "int"])));
        assert!(keys_match(&keys(&["*[]"]), &keys(&["java.lang.String[]"])));
        assert!(!keys_match(&keys(&["*[]"]), &keys(&["java.lang.String"])));
        assert!(!keys_match(&keys(&["int"]), &keys(&["long"])));
        assert!(!keys_match(&keys(&["int"]), &keys(&["int", "int"])));
    }
}
