//! Simple and qualified type name resolution following Java scoping rules.

use jolt_core::FileId;
use jolt_syntax::ast::{base_type_name, Visibility};
use jolt_syntax::is_primitive_type;

use crate::model::{Model, TypeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    One(TypeId),
    /// Several on-demand imports supply the name.
    Many(Vec<TypeId>),
    TypeVar,
    Primitive,
    NotFound,
}

impl TypeResolution {
    pub fn single(&self) -> Option<TypeId> {
        match self {
            TypeResolution::One(id) => Some(*id),
            _ => None,
        }
    }
}

/// Where a name is being looked up from.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub file: &'a FileId,
    /// Innermost enclosing type, if any.
    pub from: Option<TypeId>,
    /// Method type parameters in scope.
    pub type_vars: &'a [String],
}

impl<'a> Scope<'a> {
    pub fn new(file: &'a FileId, from: Option<TypeId>) -> Self {
        Self {
            file,
            from,
            type_vars: &[],
        }
    }

    pub fn with_type_vars(mut self, type_vars: &'a [String]) -> Self {
        self.type_vars = type_vars;
        self
    }
}

impl Model {
    /// Resolve a type as written in source, e.g. `List<String>[]` or
    /// `java.util.Map.Entry`. Array dimensions and type arguments are ignored.
    pub fn resolve_type(&self, scope: Scope<'_>, text: &str) -> TypeResolution {
        let base = base_type_name(text.trim());
        if base.is_empty() {
            return TypeResolution::NotFound;
        }
        if is_primitive_type(base) || base == "void" {
            return TypeResolution::Primitive;
        }
        if !base.contains('.') {
            return self.resolve_simple(scope, base);
        }
        if let Some(id) = self.type_by_qualified_name(base) {
            return TypeResolution::One(id);
        }
        let mut segments = base.split('.');
        let Some(head) = segments.next() else {
            return TypeResolution::NotFound;
        };
        let TypeResolution::One(mut current) = self.resolve_simple(scope, head) else {
            return TypeResolution::NotFound;
        };
        for segment in segments {
            match self.member_type(current, segment) {
                Some(next) => current = next,
                None => return TypeResolution::NotFound,
            }
        }
        TypeResolution::One(current)
    }

    fn resolve_simple(&self, scope: Scope<'_>, name: &str) -> TypeResolution {
        if scope.type_vars.iter().any(|var| var == name) {
            return TypeResolution::TypeVar;
        }

        if let Some(from) = scope.from {
            for ty in self.enclosing_chain(from) {
                let info = self.type_info(ty);
                if info.type_params.iter().any(|param| param == name) {
                    return TypeResolution::TypeVar;
                }
                if let Some(member) = self.member_type(ty, name) {
                    return TypeResolution::One(member);
                }
                if let Some(local) = self.types.iter().find(|candidate| {
                    candidate.is_local && candidate.outer == Some(ty) && candidate.name == name
                }) {
                    return TypeResolution::One(local.id);
                }
                if !info.is_anonymous() && info.name == name {
                    return TypeResolution::One(ty);
                }
            }
        }

        let Some(file_scope) = self.file_scope(scope.file) else {
            return self.java_lang(name);
        };

        if let Some(&top) = file_scope
            .top_level
            .iter()
            .find(|&&top| self.type_info(top).name == name)
        {
            return TypeResolution::One(top);
        }

        for import in file_scope.imports.iter().filter(|import| !import.is_star) {
            if import.simple_name() != Some(name) {
                continue;
            }
            if import.is_static {
                // `import static p.Outer.Nested;` may bring in a member type.
                if let Some(id) = self.type_by_qualified_name(&import.path) {
                    return TypeResolution::One(id);
                }
                continue;
            }
            return match self.type_by_qualified_name(&import.path) {
                Some(id) => TypeResolution::One(id),
                None => TypeResolution::NotFound,
            };
        }

        let same_package = qualify(&file_scope.package, name);
        if let Some(id) = self.type_by_qualified_name(&same_package) {
            return TypeResolution::One(id);
        }

        let mut on_demand: Vec<TypeId> = Vec::new();
        for import in file_scope.imports.iter().filter(|import| import.is_star) {
            if let Some(id) = self.type_by_qualified_name(&format!("{}.{name}", import.path)) {
                if !on_demand.contains(&id) {
                    on_demand.push(id);
                }
            }
        }
        match on_demand.len() {
            0 => self.java_lang(name),
            1 => TypeResolution::One(on_demand[0]),
            _ => TypeResolution::Many(on_demand),
        }
    }

    fn java_lang(&self, name: &str) -> TypeResolution {
        match self.type_by_qualified_name(&format!("java.lang.{name}")) {
            Some(id) => TypeResolution::One(id),
            None => TypeResolution::NotFound,
        }
    }

    /// Qualified names of the types a bare `text` can resolve to from inside
    /// `ty`. Primitives and type variables resolve to themselves.
    pub fn resolve_in_type(&self, ty: TypeId, type_vars: &[String], text: &str) -> Vec<String> {
        let scope = Scope::new(&self.type_info(ty).file, Some(ty)).with_type_vars(type_vars);
        match self.resolve_type(scope, text) {
            TypeResolution::One(id) => vec![self.type_info(id).qualified_name.clone()],
            TypeResolution::Many(ids) => ids
                .into_iter()
                .map(|id| self.type_info(id).qualified_name.clone())
                .collect(),
            TypeResolution::TypeVar | TypeResolution::Primitive => {
                vec![base_type_name(text).to_string()]
            }
            TypeResolution::NotFound => Vec::new(),
        }
    }

    /// Every named, non-local type called `simple_name` that code in
    /// `from_package` may refer to, sorted by qualified name.
    pub fn visible_types(&self, simple_name: &str, from_package: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .types
            .iter()
            .filter(|info| !info.is_local && !info.is_anonymous() && info.name == simple_name)
            .filter(|info| match info.visibility {
                Visibility::Public => true,
                Visibility::Private => false,
                Visibility::Package | Visibility::Protected => info.package == from_package,
            })
            .map(|info| info.qualified_name.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Erased, qualified form of a declared type used for override matching:
    /// `java.util.List[]`, `int`, `*` for type variables.
    pub(crate) fn erase(&self, scope: Scope<'_>, text: &str) -> String {
        let mut dims = text.matches("[]").count();
        if text.ends_with("...") {
            dims += 1;
        }
        let base = base_type_name(text);
        let mut key = match self.resolve_type(scope, text) {
            TypeResolution::One(id) => self.type_info(id).qualified_name.clone(),
            TypeResolution::TypeVar => "*".to_string(),
            _ => base.to_string(),
        };
        for _ in 0..dims {
            key.push_str("[]");
        }
        key
    }
}

pub(crate) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}
