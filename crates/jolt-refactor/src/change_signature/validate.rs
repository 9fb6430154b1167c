//! Syntactic validity of the requested signature.

use std::collections::HashSet;

use jolt_syntax::{is_java_identifier, parse_expression_fragment, parse_type_fragment};

use super::state::SignatureState;
use crate::status::{Problem, RefactoringStatus};

/// `text` is a usable type name. `void` is only allowed when `allow_void`.
pub(crate) fn is_valid_type_name(text: &str, allow_void: bool) -> bool {
    let text = text.trim();
    if text == "void" {
        return allow_void;
    }
    let text = text.strip_suffix("...").unwrap_or(text);
    match parse_type_fragment(text) {
        Some(ty) => ty.base_name() != "void",
        None => false,
    }
}

pub(crate) fn is_valid_expression(text: &str) -> bool {
    !text.trim().is_empty() && parse_expression_fragment(text).is_some()
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Fatal for an illegal identifier; a warning for one against convention.
fn check_identifier(name: &str, convention: impl FnOnce(String) -> Problem) -> RefactoringStatus {
    let mut status = RefactoringStatus::new();
    if name.is_empty() {
        status.add_fatal(Problem::MissingParameterName, None);
    } else if !is_java_identifier(name) {
        status.add_fatal(Problem::InvalidIdentifier { name: name.to_string() }, None);
    } else if starts_uppercase(name) {
        status.add_warning(convention(name.to_string()), None);
    }
    status
}

/// Duplicate names, parameter types, names and default values.
pub(crate) fn check_parameters(state: &SignatureState) -> RefactoringStatus {
    let mut status = RefactoringStatus::new();

    let mut seen = HashSet::new();
    for info in state.new_parameters() {
        if !info.new_name().is_empty() && !seen.insert(info.new_name()) {
            return RefactoringStatus::fatal(Problem::DuplicateParameterName {
                name: info.new_name().to_string(),
            });
        }
    }

    let last = state.new_parameters().count().saturating_sub(1);
    for (position, info) in state.new_parameters().enumerate() {
        if info.is_added() || info.is_type_changed() {
            let ty = info.new_type();
            if ty.is_empty() {
                status.add_fatal(
                    Problem::MissingParameterType {
                        name: info.new_name().to_string(),
                    },
                    None,
                );
                return status;
            }
            let misplaced_varargs = ty.ends_with("...") && position != last;
            if misplaced_varargs || !is_valid_type_name(ty, false) {
                status.add_fatal(Problem::InvalidParameterType { ty: ty.to_string() }, None);
                return status;
            }
        }

        if info.is_added() || info.is_renamed() {
            status.merge(check_identifier(info.new_name(), |name| {
                Problem::ParameterNameConvention { name }
            }));
            if status.has_fatal() {
                return status;
            }
        }

        if info.is_added() {
            let value = info.default_value();
            if value.is_empty() {
                status.add_fatal(
                    Problem::MissingDefaultValue {
                        name: info.new_name().to_string(),
                    },
                    None,
                );
                return status;
            }
            if !is_valid_expression(value) {
                status.add_fatal(
                    Problem::InvalidDefaultValue {
                        value: value.to_string(),
                    },
                    None,
                );
                return status;
            }
        }
    }
    status
}

pub(crate) fn check_return_type(state: &SignatureState) -> RefactoringStatus {
    match state.new_return_type() {
        Some(ty) if state.is_return_type_changed() && !is_valid_type_name(ty, true) => {
            RefactoringStatus::fatal(Problem::InvalidReturnType { ty: ty.to_string() })
        }
        _ => RefactoringStatus::new(),
    }
}

/// Skipped for constructors. `declaring_type` is the simple name of the type.
pub(crate) fn check_method_name(state: &SignatureState, declaring_type: &str) -> RefactoringStatus {
    if state.is_constructor() {
        return RefactoringStatus::new();
    }
    let name = state.new_name();
    if name.is_empty() || !is_java_identifier(name) {
        return RefactoringStatus::fatal(Problem::InvalidIdentifier { name: name.to_string() });
    }
    if name == declaring_type {
        return RefactoringStatus::fatal(Problem::MethodNamedLikeType { name: name.to_string() });
    }
    let mut status = RefactoringStatus::new();
    if starts_uppercase(name) {
        status.add_warning(Problem::MethodNameConvention { name: name.to_string() }, None);
    }
    status
}
