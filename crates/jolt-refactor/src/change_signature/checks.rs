//! Activation and input checking.

use std::collections::{BTreeSet, HashMap};

use jolt_index::{keys_match, MethodId, Scope};
use jolt_syntax::ast::{base_type_name, Visibility};
use jolt_syntax::is_primitive_type;
use tokio_util::sync::CancellationToken;

use super::{validate, ChangeSignature, Session};
use crate::change::Change;
use crate::status::{Problem, RefactoringStatus, Severity, StatusContext, StatusEntry};

/// Diagnostics that only echo an unresolved argument type. They duplicate the
/// type resolution errors reported earlier.
const IGNORED_COMPILE_ERRORS: &[&str] = &["argument-type-not-found"];

impl ChangeSignature<'_> {
    /// Checks that the method can be refactored at all and loads its declared
    /// exceptions.
    ///
    /// A method that implements an interface method or overrides another
    /// method is rejected; the fatal entry names the method to refactor
    /// instead as its alternate.
    pub fn check_activation(&mut self, cancel: &CancellationToken) -> RefactoringStatus {
        let db = self.db;
        let model = db.model();
        let method = model.method(self.method);
        tracing::debug!(target: "jolt.refactor", method = %self.label(), "checking activation");

        let mut status = RefactoringStatus::new();
        let unit = db.parse(&self.file);
        let Some(decl) = unit.as_deref().and_then(|unit| unit.method_decl(self.node)) else {
            return RefactoringStatus::fatal(Problem::MethodNotFound {
                file: self.file.clone(),
            });
        };
        if cancel.is_cancelled() {
            status.mark_cancelled();
            return status;
        }

        if method.is_virtual() {
            let owner = model.type_info(method.declaring_type);
            if !owner.is_interface() {
                if let Some(declared) = self.find_super_method(true) {
                    let interface = model.type_name(model.method(declared).declaring_type);
                    status.push(
                        StatusEntry::new(
                            Severity::Fatal,
                            Problem::DeclaredInInterface {
                                method: self.label(),
                                interface,
                            },
                        )
                        .with_alternate(declared),
                    );
                    return status;
                }
            }
            if let Some(overridden) = self.find_super_method(false) {
                let declaring = model.type_name(model.method(overridden).declaring_type);
                status.push(
                    StatusEntry::new(
                        Severity::Fatal,
                        Problem::OverridesAnother {
                            method: self.label(),
                            declaring,
                        },
                    )
                    .with_alternate(overridden),
                );
                return status;
            }
        }

        if !self.state.exceptions_loaded() {
            let scope = Scope::new(&self.file, Some(method.declaring_type))
                .with_type_vars(&method.type_params);
            let mut declared = Vec::new();
            for ty in decl.throws.iter().flat_map(|throws| &throws.types) {
                match model.resolve_type(scope, &ty.text).single() {
                    Some(id) => declared.push(model.type_info(id).qualified_name.clone()),
                    None => {
                        status.add_fatal(
                            Problem::UnresolvedException { name: ty.text.clone() },
                            Some(StatusContext::new(self.file.clone(), ty.range)),
                        );
                        return status;
                    }
                }
            }
            self.state.load_exceptions(declared);
        }
        status
    }

    /// The nearest method this one implements (`in_interface`) or overrides
    /// in a class. For an interface method any super interface counts.
    fn find_super_method(&self, in_interface: bool) -> Option<MethodId> {
        let model = self.db.model();
        let method = model.method(self.method);
        let owner_is_interface = model.type_info(method.declaring_type).is_interface();
        model
            .supertypes_and_self(method.declaring_type)
            .into_iter()
            .skip(1)
            .filter(|&ty| owner_is_interface || model.type_info(ty).is_interface() == in_interface)
            .flat_map(|ty| model.type_info(ty).methods.iter().copied())
            .find(|&candidate| {
                let info = model.method(candidate);
                info.is_virtual()
                    && info.name == method.name
                    && keys_match(&info.param_keys, &method.param_keys)
            })
    }

    /// Validates the requested signature against the method, its override
    /// family and its occurrences, and computes the change.
    ///
    /// On success the change is kept in a session tied to the current state
    /// version; [`Self::create_change`] hands it out.
    pub fn check_input(&mut self, cancel: &CancellationToken) -> RefactoringStatus {
        self.session = None;
        let db = self.db;
        let model = db.model();
        let label = self.label();
        tracing::debug!(
            target: "jolt.refactor",
            method = %label,
            version = self.state.version(),
            "checking input"
        );

        if self.state.is_unchanged() {
            return RefactoringStatus::fatal(Problem::Unchanged);
        }

        let mut status = validate::check_parameters(&self.state);
        if status.has_fatal() {
            return status.into_fatal();
        }
        status.merge(validate::check_return_type(&self.state));
        if status.has_fatal() {
            return status.into_fatal();
        }
        let declaring = model.type_info(self.declaring_type());
        status.merge(validate::check_method_name(&self.state, &declaring.name));
        if status.has_fatal() {
            return status.into_fatal();
        }

        let family = if self.state.is_constructor() {
            vec![self.method]
        } else {
            match db.override_family(self.method, cancel) {
                Ok(family) => family,
                Err(_) => {
                    status.mark_cancelled();
                    return status;
                }
            }
        };
        let occurrences = match db.occurrences(&family, cancel) {
            Ok(occurrences) => occurrences,
            Err(_) => {
                status.mark_cancelled();
                return status;
            }
        };
        tracing::debug!(
            target: "jolt.refactor",
            family = family.len(),
            files = occurrences.len(),
            "found occurrences"
        );

        if self.state.is_visibility_changed()
            && family.len() > 1
            && self.state.new_visibility() == Visibility::Private
        {
            status.add_warning(Problem::PrivateWithOverriders { method: label.clone() }, None);
        }

        if !self.state.is_order_unchanged() {
            for &member in &family {
                if cancel.is_cancelled() {
                    status.mark_cancelled();
                    return status;
                }
                let info = model.method(member);
                if info.is_native {
                    status.add_error(
                        Problem::NativeReorder {
                            method: info.name.clone(),
                            declaring: model.type_name(info.declaring_type),
                        },
                        None,
                    );
                }
            }
        }

        if !self.state.are_names_unchanged() {
            let original = model.method(self.method);
            let introduced: BTreeSet<&str> = self
                .state
                .new_parameters()
                .map(|info| info.new_name())
                .filter(|name| !original.param_names.iter().any(|old| old == name))
                .collect();
            for &member in &family {
                if cancel.is_cancelled() {
                    status.mark_cancelled();
                    return status;
                }
                let info = model.method(member);
                let collisions = info
                    .param_names
                    .iter()
                    .filter(|name| introduced.contains(name.as_str()));
                for name in collisions {
                    status.add_error(
                        Problem::ParameterNameCollision {
                            method: info.name.clone(),
                            declaring: model.type_name(info.declaring_type),
                            name: name.clone(),
                        },
                        None,
                    );
                }
            }
        }

        status.merge(self.resolve_types());
        if status.has_fatal() {
            return status.into_fatal();
        }
        if self.state.is_unchanged() {
            return RefactoringStatus::fatal(Problem::Unchanged);
        }

        let (change, rewrite_status) = self.build_change(&occurrences, cancel);
        status.merge(rewrite_status);
        if status.was_cancelled() {
            tracing::debug!(
                target: "jolt.refactor",
                "input check cancelled; keeping the partial change"
            );
            self.session = Some(Session {
                version: self.state.version(),
                family,
                occurrences,
                change,
            });
            return status;
        }

        let method = model.method(self.method);
        let declaring_kind = model.type_info(method.declaring_type);
        if self.options.compile_check
            && !method.is_abstract
            && !method.is_native
            && !declaring_kind.is_interface()
        {
            status.merge(self.check_compilation(&change));
        }

        if let Some(file) = change.files().find(|file| !db.is_writable(file)) {
            return RefactoringStatus::fatal(Problem::ReadOnlyFile { file: file.clone() });
        }

        tracing::debug!(
            target: "jolt.refactor",
            files = change.units().count(),
            edits = change.edit_count(),
            severity = ?status.severity(),
            "input checked"
        );
        self.session = Some(Session {
            version: self.state.version(),
            family,
            occurrences,
            change,
        });
        status
    }

    /// Replace new type names by the qualified names they denote from the
    /// declaring type. Primitives and type variables are left as written.
    /// Added exceptions are resolved the same way; one that names a declared
    /// exception folds into it.
    fn resolve_types(&mut self) -> RefactoringStatus {
        let mut status = RefactoringStatus::new();
        let pending: Vec<(usize, String)> = self
            .state
            .parameters()
            .iter()
            .enumerate()
            .filter(|(_, info)| !info.is_deleted() && (info.is_added() || info.is_type_changed()))
            .map(|(position, info)| (position, info.new_type().to_string()))
            .collect();
        for (position, ty) in pending {
            match self.resolve_type_name(&ty) {
                Ok(Some(resolved)) => self.state.resolve_parameter_type(position, &resolved),
                Ok(None) => {}
                Err(problem) => status.add_error(problem, None),
            }
        }

        if self.state.is_return_type_changed() {
            if let Some(ty) = self.state.new_return_type().map(str::to_string) {
                if ty != "void" {
                    match self.resolve_type_name(&ty) {
                        Ok(Some(resolved)) => self.state.resolve_return_type(&resolved),
                        Ok(None) => {}
                        Err(problem) => status.add_error(problem, None),
                    }
                }
            }
        }

        let added: Vec<(usize, String)> = self
            .state
            .exceptions()
            .iter()
            .enumerate()
            .filter(|(_, info)| info.is_added())
            .map(|(position, info)| (position, info.qualified_name().to_string()))
            .collect();
        for (position, name) in added.into_iter().rev() {
            match self.resolve_type_name(&name) {
                Ok(Some(resolved)) => self.state.resolve_exception(position, &resolved),
                Ok(None) => {}
                Err(problem) => status.add_error(problem, None),
            }
        }
        status
    }

    fn resolve_type_name(&self, text: &str) -> Result<Option<String>, Problem> {
        let model = self.db.model();
        let method = model.method(self.method);
        let base = base_type_name(text);
        if is_primitive_type(base) || method.type_params.iter().any(|param| param == base) {
            return Ok(None);
        }

        let mut candidates =
            self.db.resolve_in_type(method.declaring_type, &method.type_params, text);
        if candidates.is_empty() && !base.contains('.') {
            let package = &model.type_info(method.declaring_type).package;
            candidates = self.db.visible_types(base, package);
        }
        match candidates.as_slice() {
            [] => Err(Problem::TypeNotFound { name: base.to_string() }),
            [qualified] => Ok(Some(format!("{qualified}{}", &text[base.len()..]))),
            many => Err(Problem::AmbiguousType {
                name: base.to_string(),
                candidates: many.join(", "),
            }),
        }
    }

    /// New compile errors in the declaring file, compared with the errors the
    /// file already had. Positions refer to the changed text.
    fn check_compilation(&self, change: &Change) -> RefactoringStatus {
        let mut status = RefactoringStatus::new();
        let Some(unit) = change.unit(&self.file) else {
            return status;
        };
        let modified = match unit.preview() {
            Ok(modified) => modified,
            Err(err) => {
                tracing::warn!(
                    target: "jolt.refactor",
                    file = %self.file,
                    error = %err,
                    "cannot preview declaring file"
                );
                return status;
            }
        };

        let mut existing: HashMap<(&str, String), usize> = HashMap::new();
        for diagnostic in self.db.diagnostics(&self.file, &unit.original) {
            *existing.entry((diagnostic.code, diagnostic.message)).or_default() += 1;
        }
        for diagnostic in self.db.diagnostics(&self.file, &modified) {
            if !diagnostic.is_error() || IGNORED_COMPILE_ERRORS.contains(&diagnostic.code) {
                continue;
            }
            if let Some(count) = existing.get_mut(&(diagnostic.code, diagnostic.message.clone())) {
                if *count > 0 {
                    *count -= 1;
                    continue;
                }
            }
            tracing::debug!(
                target: "jolt.refactor",
                code = diagnostic.code,
                message = %diagnostic.message,
                "new compile error"
            );
            status.add_error(
                Problem::CompileError {
                    code: diagnostic.code,
                    message: diagnostic.message,
                },
                Some(StatusContext {
                    file: self.file.clone(),
                    range: diagnostic.range,
                }),
            );
        }
        status
    }
}
