use crate::{
    db::{
        primitives::{FilterExpr, FilterSlot},
        query::{QueryValidate, SqlRenderer, validate_fields, validate_table},
    },
    error::InternalError,
    traits::EntityKind,
};

///
/// DeleteQuery
///
/// Not-yet-executed `DELETE` against one table.
/// An unrestricted query (`filter == True`) matches every row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteQuery {
    pub table: String,
    pub filter: FilterExpr,
}

impl DeleteQuery {
    // ─────────────────────────────────────────────
    // CONSTRUCTORS
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: FilterExpr::True,
        }
    }

    /// Unrestricted delete against `E`'s table.
    #[must_use]
    pub fn for_entity<E: EntityKind>() -> Self {
        Self::new(E::TABLE)
    }

    // ─────────────────────────────────────────────
    // RENDERING
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn to_sql(&self, renderer: &SqlRenderer) -> String {
        renderer.delete(self)
    }
}

// ─────────────────────────────────────────────
// TRAIT IMPLEMENTATIONS
// ─────────────────────────────────────────────

impl FilterSlot for DeleteQuery {
    fn filter_slot(&mut self) -> &mut FilterExpr {
        &mut self.filter
    }
}

impl<E: EntityKind> QueryValidate<E> for DeleteQuery {
    fn validate(&self) -> Result<(), InternalError> {
        validate_table::<E>(&self.table)?;
        validate_fields::<E>(self.filter.fields())
    }
}
