use jolt_index::MethodInfo;
use jolt_syntax::ast::Visibility;

use super::model::{ExceptionChange, ExceptionInfo, ParameterInfo};
use crate::error::RefactorError;

/// The original and requested signature of the method being changed.
///
/// The parameter sequence is in new order; deleted parameters stay in it so
/// their original position can still be found. Every mutator bumps
/// [`SignatureState::version`], which lets a checked session notice that the
/// request changed underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureState {
    version: u64,
    is_constructor: bool,
    is_static: bool,
    old_name: String,
    new_name: String,
    old_return_type: Option<String>,
    new_return_type: Option<String>,
    old_visibility: Visibility,
    new_visibility: Visibility,
    original_parameter_count: usize,
    parameters: Vec<ParameterInfo>,
    exceptions: Vec<ExceptionInfo>,
    exceptions_loaded: bool,
}

impl SignatureState {
    pub fn from_method(method: &MethodInfo) -> Self {
        let parameters = method
            .param_names
            .iter()
            .zip(&method.param_types)
            .enumerate()
            .map(|(index, (name, ty))| ParameterInfo::existing(index, name.as_str(), ty.as_str()))
            .collect::<Vec<_>>();
        Self {
            version: 0,
            is_constructor: method.is_constructor,
            is_static: method.is_static,
            old_name: method.name.clone(),
            new_name: method.name.clone(),
            old_return_type: method.return_type.clone(),
            new_return_type: method.return_type.clone(),
            old_visibility: method.visibility,
            new_visibility: method.visibility,
            original_parameter_count: parameters.len(),
            parameters,
            exceptions: Vec::new(),
            exceptions_loaded: false,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    pub fn is_constructor(&self) -> bool {
        self.is_constructor
    }

    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn old_return_type(&self) -> Option<&str> {
        self.old_return_type.as_deref()
    }

    pub fn new_return_type(&self) -> Option<&str> {
        self.new_return_type.as_deref()
    }

    pub fn old_visibility(&self) -> Visibility {
        self.old_visibility
    }

    pub fn new_visibility(&self) -> Visibility {
        self.new_visibility
    }

    /// Every descriptor in new order, deleted ones included.
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// The parameters of the new signature.
    pub fn new_parameters(&self) -> impl Iterator<Item = &ParameterInfo> {
        self.parameters.iter().filter(|info| !info.is_deleted())
    }

    /// Sequence position of the parameter that was at `old_index`.
    pub fn position_of(&self, old_index: usize) -> Option<usize> {
        self.parameters
            .iter()
            .position(|info| info.old_index() == Some(old_index))
    }

    pub fn original_parameter_count(&self) -> usize {
        self.original_parameter_count
    }

    pub fn exceptions(&self) -> &[ExceptionInfo] {
        &self.exceptions
    }

    fn parameter_mut(&mut self, position: usize) -> Result<&mut ParameterInfo, RefactorError> {
        let count = self.parameters.len();
        self.parameters
            .get_mut(position)
            .ok_or(RefactorError::InvalidParameterIndex { index: position, count })
    }

    pub fn rename_parameter(&mut self, position: usize, name: &str) -> Result<(), RefactorError> {
        self.parameter_mut(position)?.set_new_name(name);
        self.bump();
        Ok(())
    }

    pub fn set_parameter_type(&mut self, position: usize, ty: &str) -> Result<(), RefactorError> {
        self.parameter_mut(position)?.set_new_type(ty);
        self.bump();
        Ok(())
    }

    pub fn set_default_value(&mut self, position: usize, value: &str) -> Result<(), RefactorError> {
        self.parameter_mut(position)?.set_default_value(value);
        self.bump();
        Ok(())
    }

    /// Mark an original parameter deleted; an added one is dropped outright.
    pub fn delete_parameter(&mut self, position: usize) -> Result<(), RefactorError> {
        if self.parameter_mut(position)?.is_added() {
            self.parameters.remove(position);
        } else {
            self.parameter_mut(position)?.set_deleted(true);
        }
        self.bump();
        Ok(())
    }

    pub fn restore_parameter(&mut self, position: usize) -> Result<(), RefactorError> {
        self.parameter_mut(position)?.set_deleted(false);
        self.bump();
        Ok(())
    }

    /// Append a new parameter; returns its position.
    pub fn add_parameter(&mut self, name: &str, ty: &str, default_value: &str) -> usize {
        self.parameters
            .push(ParameterInfo::added(name.trim(), ty.trim(), default_value.trim()));
        self.bump();
        self.parameters.len() - 1
    }

    pub fn move_parameter(&mut self, from: usize, to: usize) -> Result<(), RefactorError> {
        let count = self.parameters.len();
        if to >= count {
            return Err(RefactorError::InvalidParameterIndex { index: to, count });
        }
        self.parameter_mut(from)?;
        let info = self.parameters.remove(from);
        self.parameters.insert(to, info);
        self.bump();
        Ok(())
    }

    /// Replace the sequence by `order`, a permutation of current positions.
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), RefactorError> {
        let count = self.parameters.len();
        let mut seen = vec![false; count];
        for &position in order {
            match seen.get_mut(position) {
                Some(true) => return Err(RefactorError::DuplicateParameterIndex(position)),
                Some(slot) => *slot = true,
                None => return Err(RefactorError::InvalidParameterIndex { index: position, count }),
            }
        }
        if let Some(missing) = seen.iter().position(|seen| !seen) {
            return Err(RefactorError::InvalidParameterIndex { index: missing, count: order.len() });
        }
        self.parameters = order.iter().map(|&position| self.parameters[position].clone()).collect();
        self.bump();
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.new_name = name.trim().to_string();
        self.bump();
    }

    pub(crate) fn set_return_type(&mut self, ty: &str) {
        self.new_return_type = Some(ty.trim().to_string());
        self.bump();
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        self.new_visibility = visibility;
        self.bump();
    }

    /// Adopt a resolved type name found while checking. Not a user edit, so
    /// the version stays.
    pub(crate) fn resolve_parameter_type(&mut self, position: usize, qualified: &str) {
        if let Some(info) = self.parameters.get_mut(position) {
            info.set_new_type(qualified);
        }
    }

    pub(crate) fn resolve_return_type(&mut self, qualified: &str) {
        self.new_return_type = Some(qualified.to_string());
    }

    /// Record the type an added exception resolved to. When that type is
    /// already listed, the added entry is dropped and a removed one revived.
    pub(crate) fn resolve_exception(&mut self, position: usize, qualified: &str) {
        if !self.exceptions.get(position).is_some_and(ExceptionInfo::is_added) {
            return;
        }
        let existing = self
            .exceptions
            .iter()
            .enumerate()
            .position(|(other, info)| other != position && info.qualified_name() == qualified);
        match existing {
            Some(existing) => {
                if self.exceptions[existing].is_deleted() {
                    self.exceptions[existing].set_change(ExceptionChange::Old);
                }
                self.exceptions.remove(position);
            }
            None => self.exceptions[position].set_qualified_name(qualified),
        }
    }

    /// Add a thrown exception, reviving a removed one.
    pub fn add_exception(&mut self, qualified_name: &str) {
        let qualified_name = qualified_name.trim();
        match self
            .exceptions
            .iter_mut()
            .find(|info| info.qualified_name() == qualified_name)
        {
            Some(info) if info.is_deleted() => info.set_change(ExceptionChange::Old),
            Some(_) => return,
            None => self.exceptions.push(ExceptionInfo::added(qualified_name)),
        }
        self.bump();
    }

    /// Remove a thrown exception. Returns whether it was thrown. A simple
    /// name matches when exactly one thrown exception has it.
    pub fn remove_exception(&mut self, name: &str) -> bool {
        let name = name.trim();
        let live = || {
            self.exceptions
                .iter()
                .enumerate()
                .filter(|(_, info)| !info.is_deleted())
        };
        let mut found = live()
            .find(|(_, info)| info.qualified_name() == name)
            .map(|(position, _)| position);
        if found.is_none() && !name.contains('.') {
            let mut simple = live().filter(|(_, info)| info.simple_name() == name);
            found = match (simple.next(), simple.next()) {
                (Some((position, _)), None) => Some(position),
                _ => None,
            };
        }
        let Some(position) = found else {
            return false;
        };
        if self.exceptions[position].is_added() {
            self.exceptions.remove(position);
        } else {
            self.exceptions[position].set_change(ExceptionChange::Deleted);
        }
        self.bump();
        true
    }

    pub(crate) fn exceptions_loaded(&self) -> bool {
        self.exceptions_loaded
    }

    /// Install the declared exceptions, keeping exceptions added before.
    pub(crate) fn load_exceptions(&mut self, declared: Vec<String>) {
        let added = std::mem::take(&mut self.exceptions);
        self.exceptions = declared.into_iter().map(ExceptionInfo::old).collect();
        for info in added {
            if !self
                .exceptions
                .iter()
                .any(|old| old.qualified_name() == info.qualified_name())
            {
                self.exceptions.push(info);
            }
        }
        self.exceptions_loaded = true;
    }

    pub fn is_name_changed(&self) -> bool {
        !self.is_constructor && self.old_name != self.new_name
    }

    pub fn is_return_type_changed(&self) -> bool {
        !self.is_constructor && self.old_return_type != self.new_return_type
    }

    pub fn is_visibility_changed(&self) -> bool {
        self.old_visibility != self.new_visibility
    }

    pub fn are_exceptions_changed(&self) -> bool {
        self.exceptions.iter().any(|info| !info.is_old())
    }

    /// Every original parameter kept, nothing added, nothing moved.
    pub fn is_order_unchanged(&self) -> bool {
        self.parameters
            .iter()
            .enumerate()
            .all(|(position, info)| info.old_index() == Some(position) && !info.is_deleted())
    }

    pub fn are_names_unchanged(&self) -> bool {
        self.parameters.iter().all(|info| !info.is_renamed())
    }

    pub fn are_types_unchanged(&self) -> bool {
        self.parameters.iter().all(|info| !info.is_type_changed())
    }

    pub fn has_deleted_parameters(&self) -> bool {
        self.parameters.iter().any(ParameterInfo::is_deleted)
    }

    pub fn has_added_parameters(&self) -> bool {
        self.parameters.iter().any(ParameterInfo::is_added)
    }

    pub fn is_unchanged(&self) -> bool {
        if self.is_visibility_changed()
            || self.is_name_changed()
            || self.is_return_type_changed()
            || self.are_exceptions_changed()
        {
            return false;
        }
        if self.original_parameter_count == 0 && self.parameters.is_empty() {
            return true;
        }
        self.are_names_unchanged() && self.is_order_unchanged() && self.are_types_unchanged()
    }

    /// `visibility [static] [return] name(T a, U b) throws X, Y`.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        if let Some(keyword) = self.new_visibility.keyword() {
            out.push_str(keyword);
            out.push(' ');
        }
        if self.is_static {
            out.push_str("static ");
        }
        if let (false, Some(ret)) = (self.is_constructor, &self.new_return_type) {
            out.push_str(ret);
            out.push(' ');
        }
        out.push_str(&self.new_name);
        out.push('(');
        let params: Vec<String> = self
            .new_parameters()
            .map(|info| format!("{} {}", info.new_type(), info.new_name()))
            .collect();
        out.push_str(&params.join(", "));
        out.push(')');
        let thrown: Vec<&str> = self
            .exceptions
            .iter()
            .filter(|info| !info.is_deleted())
            .map(ExceptionInfo::simple_name)
            .collect();
        if !thrown.is_empty() {
            out.push_str(" throws ");
            out.push_str(&thrown.join(", "));
        }
        out
    }
}
