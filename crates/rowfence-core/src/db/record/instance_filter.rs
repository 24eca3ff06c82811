use crate::{
    db::{
        executor::{MutationHook, MutationOutcome},
        primitives::{FilterExpr, FilterExt, FilterSlot, IntoFilterExpr},
        query::{DeleteQuery, MutationKind, UpdateQuery},
        record::FilterContext,
    },
    error::InternalError,
    obs::{MetricsEvent, sink},
};
use std::{fmt, rc::Rc};
use thiserror::Error as ThisError;

///
/// DynamicRestriction
///
/// Restriction computed from the query-building context when the filters
/// are applied, not when they are added.
///

pub type DynamicRestriction = Rc<dyn Fn(&FilterContext<'_>) -> FilterExpr>;

///
/// InstanceFilterMismatch
///
/// A record mutation did not affect exactly one row.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error(
    "instance filter mismatch: {kind} affected {rows_affected} rows, expected exactly 1 (sql: {sql})"
)]
pub struct InstanceFilterMismatch {
    pub kind: MutationKind,
    pub rows_affected: u64,
    pub sql: String,
}

///
/// FilterPredicate
///

#[derive(Clone)]
pub struct FilterPredicate {
    restriction: FilterExpr,
    dynamic: Option<DynamicRestriction>,
}

impl FilterPredicate {
    #[must_use]
    pub const fn restriction(&self) -> &FilterExpr {
        &self.restriction
    }

    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic.is_some()
    }

    // Restriction first, then the dynamic part evaluated against `ctx`.
    fn resolve(&self, ctx: &FilterContext<'_>) -> FilterExpr {
        let dynamic = self.dynamic.as_ref().map(|f| f(ctx));

        self.restriction.clone().and_neutral(dynamic.unwrap_or_default())
    }
}

impl fmt::Debug for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPredicate")
            .field("restriction", &self.restriction)
            .field("dynamic", &self.dynamic.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

///
/// InstanceFilterSet
///
/// Ordered restrictions attached to one record handle and merged into its
/// delete and update statements.
///
/// The set is emptied after a mutation that affected exactly one row and
/// kept intact after any failure.
///

#[derive(Clone, Debug, Default)]
pub struct InstanceFilterSet {
    predicates: Vec<FilterPredicate>,
}

impl InstanceFilterSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Append a restriction with an optional dynamic part.
    pub fn add(&mut self, restriction: impl IntoFilterExpr, dynamic: Option<DynamicRestriction>) {
        self.predicates.push(FilterPredicate {
            restriction: restriction.into_expr(),
            dynamic,
        });
    }

    /// Append a restriction computed at apply time.
    pub fn add_dynamic(
        &mut self,
        dynamic: impl Fn(&FilterContext<'_>) -> FilterExpr + 'static,
    ) {
        self.add(FilterExpr::True, Some(Rc::new(dynamic)));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.predicates.iter()
    }

    // ─────────────────────────────────────────────
    // QUERY REWRITING
    // ─────────────────────────────────────────────

    /// Conjoin every predicate onto `query`, in insertion order.
    #[must_use]
    pub fn apply<Q: FilterSlot>(&self, ctx: &FilterContext<'_>, query: Q) -> Q {
        self.predicates
            .iter()
            .fold(query, |query, predicate| query.filter(predicate.resolve(ctx)))
    }

    // ─────────────────────────────────────────────
    // POST-CONDITION
    // ─────────────────────────────────────────────

    /// Require that the executed statement touched exactly one row.
    ///
    /// Runs whether or not any filters were added.
    pub fn enforce_single_row_affected(
        &self,
        kind: MutationKind,
        rows_affected: u64,
        sql: &str,
    ) -> Result<(), InstanceFilterMismatch> {
        if rows_affected == 1 {
            return Ok(());
        }

        Err(InstanceFilterMismatch {
            kind,
            rows_affected,
            sql: sql.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }
}

// ─────────────────────────────────────────────
// EXECUTOR HOOK
// ─────────────────────────────────────────────

impl MutationHook for InstanceFilterSet {
    fn rewrite_delete(&self, ctx: &FilterContext<'_>, query: DeleteQuery) -> DeleteQuery {
        self.apply(ctx, query)
    }

    fn rewrite_update(&self, ctx: &FilterContext<'_>, query: UpdateQuery) -> UpdateQuery {
        self.apply(ctx, query)
    }

    fn verify(&self, outcome: &MutationOutcome) -> Result<(), InternalError> {
        self.enforce_single_row_affected(outcome.kind, outcome.rows_affected, &outcome.sql)
            .map_err(|err| {
                sink::record(MetricsEvent::InstanceFilterMismatch {
                    kind: outcome.kind,
                    entity_path: outcome.entity_path,
                    rows_affected: outcome.rows_affected,
                });
                tracing::warn!(
                    entity = outcome.entity_path,
                    kind = %outcome.kind,
                    rows_affected = outcome.rows_affected,
                    filters = self.len(),
                    sql = %outcome.sql,
                    "instance filter mismatch"
                );

                InternalError::from(err)
            })
    }

    fn after_success(&mut self, outcome: &MutationOutcome) {
        let count = self.len() as u64;
        self.clear();

        sink::record(MetricsEvent::InstanceFiltersCleared {
            kind: outcome.kind,
            entity_path: outcome.entity_path,
            count,
        });
        tracing::debug!(
            entity = outcome.entity_path,
            kind = %outcome.kind,
            count,
            "instance filters cleared"
        );
    }
}
