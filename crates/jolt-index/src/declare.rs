//! Builds the [`Model`] from parsed compilation units.
//!
//! Pass one records every type (nested, local and anonymous ones included)
//! and every method. Pass two resolves supertypes and, once the hierarchy is
//! in place, the erased parameter keys used to match overrides.

use std::sync::Arc;

use jolt_core::FileId;
use jolt_syntax::ast::{
    Block, ClassBody, CompilationUnit, EnumConstant, Expr, FieldDecl, Member, MethodDecl, Modifier,
    NodeId, TypeDecl, TypeKind, Visibility,
};
use jolt_syntax::visit::{self, Visitor};
use jolt_syntax::Parse;

use crate::jdk;
use crate::model::{FieldInfo, FileScope, MethodId, MethodInfo, Model, Origin, TypeId, TypeInfo};
use crate::resolve::{qualify, Scope, TypeResolution};

enum Supers {
    Declared {
        extends: Vec<String>,
        implements: Vec<String>,
    },
    /// `new Base() { .. }`: a class base becomes the super class, an
    /// interface base an implemented interface.
    Anonymous(String),
    /// Enum constant body: the enum itself.
    Fixed(TypeId),
}

struct PendingSupers {
    ty: TypeId,
    supers: Supers,
}

pub(crate) fn build_model(sources: &[(FileId, Arc<Parse>)]) -> Model {
    let mut model = Model::default();
    let mut pending = Vec::new();

    for (file, parse) in jdk::stub_units() {
        declare_unit(&mut model, &mut pending, file, parse.compilation_unit(), false);
    }
    for (file, parse) in sources {
        declare_unit(&mut model, &mut pending, file, parse.compilation_unit(), true);
    }

    resolve_supertypes(&mut model, pending);
    compute_param_keys(&mut model);

    tracing::debug!(
        target: "jolt.index",
        types = model.types.len(),
        methods = model.methods.len(),
        "built declaration model"
    );
    model
}

fn declare_unit(
    model: &mut Model,
    pending: &mut Vec<PendingSupers>,
    file: &FileId,
    unit: &CompilationUnit,
    source: bool,
) {
    model.scopes.insert(
        file.clone(),
        FileScope {
            package: unit.package_name().to_string(),
            imports: unit.imports.clone(),
            top_level: Vec::new(),
        },
    );
    let mut declarer = Declarer {
        model,
        pending,
        file,
        package: unit.package_name(),
        source,
        stack: Vec::new(),
        block_depth: vec![0],
    };
    visit::walk_compilation_unit(&mut declarer, unit);
}

struct Declarer<'m> {
    model: &'m mut Model,
    pending: &'m mut Vec<PendingSupers>,
    file: &'m FileId,
    package: &'m str,
    source: bool,
    stack: Vec<TypeId>,
    /// Block nesting per enclosing type; a type declared at depth > 0 is local.
    block_depth: Vec<usize>,
}

impl Declarer<'_> {
    fn origin(&self, node: NodeId) -> Origin {
        if self.source {
            Origin::Source {
                file: self.file.clone(),
                node,
            }
        } else {
            Origin::Library
        }
    }

    fn in_block(&self) -> bool {
        self.block_depth.last().copied().unwrap_or(0) > 0
    }

    fn outer_is_interface(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|&outer| self.model.type_info(outer).is_interface())
    }

    fn push_type(&mut self, mut info: TypeInfo, node: NodeId) -> TypeId {
        let id = TypeId(self.model.types.len() as u32);
        info.id = id;
        if !info.is_local && !info.is_anonymous() {
            self.model
                .by_qualified
                .entry(info.qualified_name.clone())
                .or_insert(id);
        }
        match info.outer {
            Some(outer) if !info.is_local => self.model.types[outer.0 as usize].nested.push(id),
            None => {
                if let Some(scope) = self.model.scopes.get_mut(self.file) {
                    scope.top_level.push(id);
                }
            }
            Some(_) => {}
        }
        self.model
            .node_types
            .entry(self.file.clone())
            .or_default()
            .insert(node, id);
        self.model.types.push(info);
        id
    }

    fn enter(&mut self, id: TypeId) {
        self.stack.push(id);
        self.block_depth.push(0);
    }

    fn leave(&mut self) {
        self.stack.pop();
        self.block_depth.pop();
    }

    fn declare_fields(&mut self, id: TypeId, body: &ClassBody, enum_name: Option<&str>) {
        let interface = self.model.type_info(id).is_interface();
        let mut fields = Vec::new();
        for member in &body.members {
            match member {
                Member::Field(field) => fields.extend(field_infos(field, interface)),
                Member::EnumConstant(constant) => {
                    if let Some(name) = enum_name {
                        fields.push(FieldInfo {
                            name: constant.name.text.clone(),
                            ty: name.to_string(),
                            is_static: true,
                        });
                    }
                }
                _ => {}
            }
        }
        self.model.types[id.0 as usize].fields = fields;
    }

    fn anonymous(&mut self, node: NodeId, base: String, body: &ClassBody) -> TypeId {
        let info = TypeInfo {
            id: TypeId(0),
            name: String::new(),
            qualified_name: String::new(),
            package: self.package.to_string(),
            kind: TypeKind::Class,
            visibility: Visibility::Package,
            is_static: false,
            is_local: true,
            origin: self.origin(node),
            file: self.file.clone(),
            outer: self.stack.last().copied(),
            anonymous_base: Some(base),
            super_class: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            nested: Vec::new(),
            incomplete_hierarchy: false,
        };
        let id = self.push_type(info, node);
        self.declare_fields(id, body, None);
        id
    }
}

fn field_infos(field: &FieldDecl, interface: bool) -> Vec<FieldInfo> {
    let is_static = interface || field.modifiers.has(Modifier::Static);
    field
        .vars
        .iter()
        .map(|var| FieldInfo {
            name: var.name.text.clone(),
            ty: field.ty.text.clone(),
            is_static,
        })
        .collect()
}

impl<'a> Visitor<'a> for Declarer<'_> {
    fn visit_type_decl(&mut self, decl: &'a TypeDecl) {
        let outer = self.stack.last().copied();
        let is_local = self.in_block();
        let outer_interface = self.outer_is_interface();
        let qualified_name = match outer {
            _ if is_local => decl.name.text.clone(),
            Some(outer) => format!(
                "{}.{}",
                self.model.type_info(outer).qualified_name,
                decl.name.text
            ),
            None => qualify(self.package, &decl.name.text),
        };
        let visibility = if outer_interface && decl.modifiers.visibility_keyword().is_none() {
            Visibility::Public
        } else {
            decl.modifiers.visibility()
        };
        let is_static = decl.modifiers.has(Modifier::Static)
            || outer_interface
            || matches!(
                decl.kind,
                TypeKind::Enum | TypeKind::Interface | TypeKind::Annotation | TypeKind::Record
            );
        let info = TypeInfo {
            id: TypeId(0),
            name: decl.name.text.clone(),
            qualified_name,
            package: self.package.to_string(),
            kind: decl.kind,
            visibility,
            is_static,
            is_local,
            origin: self.origin(decl.id),
            file: self.file.clone(),
            outer,
            anonymous_base: None,
            super_class: None,
            interfaces: Vec::new(),
            type_params: decl.type_params.clone(),
            methods: Vec::new(),
            fields: Vec::new(),
            nested: Vec::new(),
            incomplete_hierarchy: false,
        };
        let id = self.push_type(info, decl.id);
        let enum_name = (decl.kind == TypeKind::Enum).then_some(decl.name.text.as_str());
        self.declare_fields(id, &decl.body, enum_name);
        self.pending.push(PendingSupers {
            ty: id,
            supers: Supers::Declared {
                extends: decl.extends.iter().map(|ty| ty.text.clone()).collect(),
                implements: decl.implements.iter().map(|ty| ty.text.clone()).collect(),
            },
        });

        self.enter(id);
        visit::walk_type_decl(self, decl);
        self.leave();
    }

    fn visit_method(&mut self, method: &'a MethodDecl) {
        let Some(&declaring_type) = self.stack.last() else {
            return;
        };
        let owner = self.model.type_info(declaring_type);
        let interface = owner.is_interface();
        let is_enum = owner.kind == TypeKind::Enum;
        let modifiers = &method.modifiers;

        let visibility = match modifiers.visibility_keyword() {
            Some(_) => modifiers.visibility(),
            None if interface => Visibility::Public,
            None if is_enum && method.is_constructor() => Visibility::Private,
            None => Visibility::Package,
        };
        let is_static = modifiers.has(Modifier::Static);
        let is_abstract = modifiers.has(Modifier::Abstract)
            || (interface
                && method.body.is_none()
                && !is_static
                && !modifiers.has(Modifier::Default)
                && !modifiers.has(Modifier::Private));

        let id = MethodId(self.model.methods.len() as u32);
        self.model.methods.push(MethodInfo {
            id,
            name: method.name.text.clone(),
            declaring_type,
            is_constructor: method.is_constructor(),
            visibility,
            is_static,
            is_abstract,
            is_native: modifiers.has(Modifier::Native),
            type_params: method.type_params.clone(),
            param_names: method
                .params
                .params
                .iter()
                .map(|param| param.name.text.clone())
                .collect(),
            param_types: method.params.params.iter().map(|param| param.type_text()).collect(),
            param_keys: Vec::new(),
            return_type: method.return_ty.as_ref().map(|ty| ty.text.clone()),
            throws: method
                .throws
                .iter()
                .flat_map(|throws| throws.types.iter().map(|ty| ty.text.clone()))
                .collect(),
            varargs: method.params.params.last().is_some_and(|param| param.varargs),
            origin: self.origin(method.id),
        });
        self.model.types[declaring_type.0 as usize].methods.push(id);
        self.model
            .node_methods
            .entry(self.file.clone())
            .or_default()
            .insert(method.id, id);

        visit::walk_method(self, method);
    }

    fn visit_block(&mut self, block: &'a Block) {
        if let Some(depth) = self.block_depth.last_mut() {
            *depth += 1;
        }
        visit::walk_block(self, block);
        if let Some(depth) = self.block_depth.last_mut() {
            *depth -= 1;
        }
    }

    fn visit_field(&mut self, field: &'a FieldDecl) {
        // Anonymous classes in initializers are local to the enclosing type.
        if let Some(depth) = self.block_depth.last_mut() {
            *depth += 1;
        }
        visit::walk_field(self, field);
        if let Some(depth) = self.block_depth.last_mut() {
            *depth -= 1;
        }
    }

    fn visit_enum_constant(&mut self, constant: &'a EnumConstant) {
        if let Some(args) = &constant.args {
            for arg in &args.args {
                self.visit_expr(arg);
            }
        }
        let (Some(body), Some(&enum_type)) = (&constant.body, self.stack.last()) else {
            return;
        };
        let base = self.model.type_info(enum_type).name.clone();
        let id = self.anonymous(constant.id, base, body);
        self.pending.push(PendingSupers {
            ty: id,
            supers: Supers::Fixed(enum_type),
        });
        self.enter(id);
        self.visit_class_body(body);
        self.leave();
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        let Expr::New(new) = expr else {
            visit::walk_expr(self, expr);
            return;
        };
        let Some(body) = &new.body else {
            visit::walk_expr(self, expr);
            return;
        };
        if let Some(outer) = &new.outer {
            self.visit_expr(outer);
        }
        for arg in &new.args.args {
            self.visit_expr(arg);
        }
        let id = self.anonymous(new.id, new.ty.text.clone(), body);
        self.pending.push(PendingSupers {
            ty: id,
            supers: Supers::Anonymous(new.ty.text.clone()),
        });
        self.enter(id);
        self.visit_class_body(body);
        self.leave();
    }
}

fn resolve_supertypes(model: &mut Model, pending: Vec<PendingSupers>) {
    let object = model.object_type();
    let enum_base = model.type_by_qualified_name("java.lang.Enum");
    let record_base = model.type_by_qualified_name("java.lang.Record");

    for PendingSupers { ty, supers } in pending {
        let info = model.type_info(ty);
        let kind = info.kind;
        let file = info.file.clone();
        let scope_from = if info.is_anonymous() { info.outer } else { Some(ty) };
        let mut missing = false;
        let mut lookup = |model: &Model, text: &str| -> Option<TypeId> {
            match model.resolve_type(Scope::new(&file, scope_from), text) {
                TypeResolution::One(id) if id != ty => Some(id),
                _ => {
                    missing = true;
                    None
                }
            }
        };

        let (super_class, interfaces) = match supers {
            Supers::Declared {
                extends,
                implements,
            } => {
                let extends: Vec<TypeId> =
                    extends.iter().filter_map(|text| lookup(model, text)).collect();
                let implements: Vec<TypeId> =
                    implements.iter().filter_map(|text| lookup(model, text)).collect();
                match kind {
                    TypeKind::Interface | TypeKind::Annotation => {
                        (None, extends.into_iter().chain(implements).collect())
                    }
                    TypeKind::Enum => (enum_base, implements),
                    TypeKind::Record => (record_base, implements),
                    TypeKind::Class => (extends.first().copied().or(object), implements),
                }
            }
            Supers::Anonymous(base) => match lookup(model, &base) {
                Some(base) if model.type_info(base).is_interface() => (object, vec![base]),
                Some(base) => (Some(base), Vec::new()),
                None => (object, Vec::new()),
            },
            Supers::Fixed(base) => (Some(base), Vec::new()),
        };

        let super_class = super_class.filter(|&sup| sup != ty);
        let info = &mut model.types[ty.0 as usize];
        info.super_class = super_class;
        info.interfaces = interfaces;
        info.incomplete_hierarchy = missing;
    }
}

fn compute_param_keys(model: &mut Model) {
    let mut keys = Vec::with_capacity(model.methods.len());
    for method in &model.methods {
        let declaring = method.declaring_type;
        let file = &model.type_info(declaring).file;
        let scope = Scope::new(file, Some(declaring)).with_type_vars(&method.type_params);
        keys.push(
            method
                .param_types
                .iter()
                .map(|text| model.erase(scope, text))
                .collect::<Vec<_>>(),
        );
    }
    for (method, keys) in model.methods.iter_mut().zip(keys) {
        method.param_keys = keys;
    }
}
