/// One parameter of the signature being edited.
///
/// Existing parameters remember the index they had in the original
/// declaration; added ones have none and carry the expression that call sites
/// pass for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    old_index: Option<usize>,
    old_name: String,
    new_name: String,
    old_type: String,
    new_type: String,
    default_value: String,
    deleted: bool,
}

impl ParameterInfo {
    pub(crate) fn existing(index: usize, name: impl Into<String>, ty: impl Into<String>) -> Self {
        let name = name.into();
        let ty = ty.into();
        Self {
            old_index: Some(index),
            old_name: name.clone(),
            new_name: name,
            old_type: ty.clone(),
            new_type: ty,
            default_value: String::new(),
            deleted: false,
        }
    }

    pub(crate) fn added(
        name: impl Into<String>,
        ty: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            old_index: None,
            old_name: String::new(),
            new_name: name.into(),
            old_type: String::new(),
            new_type: ty.into(),
            default_value: default_value.into(),
            deleted: false,
        }
    }

    /// Position in the original declaration; `None` for added parameters.
    pub fn old_index(&self) -> Option<usize> {
        self.old_index
    }

    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn old_type(&self) -> &str {
        &self.old_type
    }

    pub fn new_type(&self) -> &str {
        &self.new_type
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn is_added(&self) -> bool {
        self.old_index.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_renamed(&self) -> bool {
        self.old_name != self.new_name
    }

    pub fn is_type_changed(&self) -> bool {
        self.old_type != self.new_type
    }

    pub(crate) fn set_new_name(&mut self, name: &str) {
        self.new_name = name.trim().to_string();
    }

    pub(crate) fn set_new_type(&mut self, ty: &str) {
        self.new_type = ty.trim().to_string();
    }

    pub(crate) fn set_default_value(&mut self, value: &str) {
        self.default_value = value.trim().to_string();
    }

    /// Added parameters are removed from the sequence instead.
    pub(crate) fn set_deleted(&mut self, deleted: bool) {
        debug_assert!(!self.is_added() || !deleted);
        self.deleted = deleted;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionChange {
    Old,
    Added,
    Deleted,
}

/// A thrown exception type, identified by its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    qualified_name: String,
    change: ExceptionChange,
}

impl ExceptionInfo {
    pub(crate) fn old(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            change: ExceptionChange::Old,
        }
    }

    pub(crate) fn added(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            change: ExceptionChange::Added,
        }
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn change(&self) -> ExceptionChange {
        self.change
    }

    pub fn is_old(&self) -> bool {
        self.change == ExceptionChange::Old
    }

    pub fn is_added(&self) -> bool {
        self.change == ExceptionChange::Added
    }

    pub fn is_deleted(&self) -> bool {
        self.change == ExceptionChange::Deleted
    }

    pub(crate) fn set_qualified_name(&mut self, qualified_name: &str) {
        self.qualified_name = qualified_name.to_string();
    }

    pub(crate) fn set_change(&mut self, change: ExceptionChange) {
        self.change = change;
    }
}
