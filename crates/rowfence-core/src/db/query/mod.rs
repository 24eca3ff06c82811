mod delete;
mod render;
mod update;

use crate::{error::InternalError, traits::EntityKind};
use derive_more::Display;

// re-exports
pub use delete::DeleteQuery;
pub use render::SqlRenderer;
pub use update::UpdateQuery;

///
/// MutationKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum MutationKind {
    #[display("delete")]
    Delete,
    #[display("update")]
    Update,
}

///
/// QueryValidate
///
/// Shape checks the engine runs before executing a statement.
/// Instance filters are never validated on add; they reach this
/// check only as part of the statement they were merged into.
///

pub trait QueryValidate<E: EntityKind> {
    fn validate(&self) -> Result<(), InternalError>;
}

pub(crate) fn validate_table<E: EntityKind>(table: &str) -> Result<(), InternalError> {
    if table == E::TABLE {
        Ok(())
    } else {
        Err(InternalError::query_invariant(format!(
            "statement targets table '{table}' but executor is bound to {} ('{}')",
            E::PATH,
            E::TABLE
        )))
    }
}

pub(crate) fn validate_fields<'a, E: EntityKind>(
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<(), InternalError> {
    for field in fields {
        if !E::has_field(field) {
            return Err(InternalError::query_unsupported(format!(
                "unknown field '{field}' on {}",
                E::PATH
            )));
        }
    }

    Ok(())
}
