use crate::{
    db::{
        primitives::{FilterExpr, FilterSlot},
        query::{QueryValidate, SqlRenderer, validate_fields, validate_table},
    },
    error::InternalError,
    traits::{EntityKind, FieldValue},
    value::Value,
};

///
/// UpdateQuery
///
/// Not-yet-executed `UPDATE` against one table: the column values being
/// written plus the restriction selecting target rows.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateQuery {
    pub table: String,
    pub set: Vec<(String, Value)>,
    pub filter: FilterExpr,
}

impl UpdateQuery {
    // ─────────────────────────────────────────────
    // CONSTRUCTORS
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set: Vec::new(),
            filter: FilterExpr::True,
        }
    }

    /// Unrestricted update against `E`'s table.
    #[must_use]
    pub fn for_entity<E: EntityKind>() -> Self {
        Self::new(E::TABLE)
    }

    /// Write `value` into `field`. A later write to the same column replaces
    /// the earlier one in place.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl FieldValue) -> Self {
        let field = field.into();
        let value = value.to_value();

        match self.set.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.set.push((field, value)),
        }

        self
    }

    #[must_use]
    pub fn set_all<I, K, V>(self, changes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        changes
            .into_iter()
            .fold(self, |query, (field, value)| query.set(field, value))
    }

    // ─────────────────────────────────────────────
    // RENDERING
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn to_sql(&self, renderer: &SqlRenderer) -> String {
        renderer.update(self)
    }
}

// ─────────────────────────────────────────────
// TRAIT IMPLEMENTATIONS
// ─────────────────────────────────────────────

impl FilterSlot for UpdateQuery {
    fn filter_slot(&mut self) -> &mut FilterExpr {
        &mut self.filter
    }
}

impl<E: EntityKind> QueryValidate<E> for UpdateQuery {
    fn validate(&self) -> Result<(), InternalError> {
        validate_table::<E>(&self.table)?;

        if self.set.is_empty() {
            return Err(InternalError::query_unsupported(format!(
                "update on {} writes no columns",
                E::PATH
            )));
        }

        validate_fields::<E>(self.set.iter().map(|(field, _)| field.as_str()))?;
        validate_fields::<E>(self.filter.fields())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_set_replaces_in_place() {
        let q = UpdateQuery::new("t")
            .set("a", 1)
            .set("b", 2)
            .set("a", 3);

        assert_eq!(
            q.set,
            vec![
                ("a".to_string(), Value::Int(3)),
                ("b".to_string(), Value::Int(2)),
            ]
        );
    }
}
