//! In-memory semantic index over a set of Java sources.
//!
//! [`Workspace`] owns the file texts, parses them with `jolt-syntax`, builds a
//! declaration [`Model`] (JDK stubs included) and binds every call, `new`,
//! constructor call, doc reference and type reference to the model. On top of
//! that it answers the hierarchy questions a signature refactoring asks:
//! override families, occurrences, subclasses and visible type names.

mod bind;
mod declare;
mod jdk;
mod model;
mod resolve;
mod search;
mod workspace;

pub use bind::FileBindings;
pub use model::{
    keys_match, FieldInfo, FileScope, MethodId, MethodInfo, Model, Origin, TypeId, TypeInfo,
};
pub use resolve::{Scope, TypeResolution};
pub use search::Cancelled;
pub use workspace::{AnnotatedUnit, CommitError, Workspace};
