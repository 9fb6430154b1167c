use std::collections::HashSet;

use jolt_syntax::ast::Visibility;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::state::SignatureState;
use crate::error::RefactorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParameterOperation {
    /// Keep a parameter of the old signature, optionally renaming or retyping it.
    Existing {
        old_index: usize,
        #[serde(default)]
        new_name: Option<String>,
        #[serde(default)]
        new_type: Option<String>,
    },
    /// Add a new parameter.
    Add {
        name: String,
        ty: String,
        /// Expression passed for the new parameter at every call site.
        default_value: String,
    },
}

/// A declarative description of a whole signature change.
///
/// `parameters` lists the new parameter list in order. Original parameters
/// that are not listed are deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangeSignatureRequest {
    #[serde(default)]
    pub parameters: Option<Vec<ParameterOperation>>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub new_return_type: Option<String>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub new_visibility: Option<Visibility>,
    /// Qualified names of exception types to add to the `throws` clause.
    #[serde(default)]
    pub add_exceptions: Vec<String>,
    #[serde(default)]
    pub remove_exceptions: Vec<String>,
}

impl ChangeSignatureRequest {
    /// Apply the parameter and exception edits to `state`.
    ///
    /// Name, return type and visibility need the refactoring's own checks and
    /// are applied by [`super::ChangeSignature::apply_request`].
    pub fn apply_to(&self, state: &mut SignatureState) -> Result<(), RefactorError> {
        if let Some(parameters) = &self.parameters {
            apply_parameters(parameters, state)?;
        }
        for name in &self.remove_exceptions {
            state.remove_exception(name);
        }
        for name in &self.add_exceptions {
            state.add_exception(name);
        }
        Ok(())
    }
}

fn apply_parameters(
    operations: &[ParameterOperation],
    state: &mut SignatureState,
) -> Result<(), RefactorError> {
    let count = state.original_parameter_count();
    let mut listed = HashSet::new();
    for operation in operations {
        if let ParameterOperation::Existing { old_index, .. } = operation {
            if *old_index >= count {
                return Err(RefactorError::InvalidParameterIndex { index: *old_index, count });
            }
            if !listed.insert(*old_index) {
                return Err(RefactorError::DuplicateParameterIndex(*old_index));
            }
        }
    }

    // Rebuild the sequence from the original parameters: listed ones in the
    // requested order, then the deleted ones.
    let mut order = Vec::with_capacity(count);
    for operation in operations {
        match operation {
            ParameterOperation::Existing {
                old_index,
                new_name,
                new_type,
            } => {
                let position = position_of(state, *old_index)?;
                let info = &state.parameters()[position];
                let name = new_name.clone().unwrap_or_else(|| info.old_name().to_string());
                let ty = new_type.clone().unwrap_or_else(|| info.old_type().to_string());
                state.restore_parameter(position)?;
                state.rename_parameter(position, &name)?;
                state.set_parameter_type(position, &ty)?;
                order.push(position);
            }
            ParameterOperation::Add {
                name,
                ty,
                default_value,
            } => {
                order.push(state.add_parameter(name, ty, default_value));
            }
        }
    }
    for old_index in (0..count).filter(|index| !listed.contains(index)) {
        let position = position_of(state, old_index)?;
        state.delete_parameter(position)?;
        order.push(position);
    }

    // Added parameters from an earlier request are dropped.
    let stale: Vec<usize> = (0..state.parameters().len())
        .filter(|position| !order.contains(position))
        .collect();
    for position in stale.into_iter().rev() {
        state.delete_parameter(position)?;
        for entry in order.iter_mut() {
            if *entry > position {
                *entry -= 1;
            }
        }
    }
    state.reorder(&order)
}

fn position_of(state: &SignatureState, old_index: usize) -> Result<usize, RefactorError> {
    state
        .position_of(old_index)
        .ok_or(RefactorError::InvalidParameterIndex {
            index: old_index,
            count: state.original_parameter_count(),
        })
}
