use crate::{
    db::{
        query::{DeleteQuery, MutationKind, UpdateQuery},
        record::FilterContext,
    },
    error::InternalError,
};

///
/// MutationOutcome
///
/// What one executed mutation reported back: the statement text that ran
/// and how many rows it touched.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub entity_path: &'static str,
    pub rows_affected: u64,
    pub sql: String,
}

///
/// MutationHook
///
/// Interception seam around [`MutationExecutor`](super::MutationExecutor).
///
/// Hooks run in registration order at every stage:
/// rewrite the query, verify the outcome, then observe success.
/// `verify` sees the staged row count before anything is written; an error
/// from any hook cancels the mutation. `after_success` is only reached once
/// every hook's `verify` passed and the rows were committed.
///

pub trait MutationHook {
    fn rewrite_delete(&self, _ctx: &FilterContext<'_>, query: DeleteQuery) -> DeleteQuery {
        query
    }

    fn rewrite_update(&self, _ctx: &FilterContext<'_>, query: UpdateQuery) -> UpdateQuery {
        query
    }

    fn verify(&self, _outcome: &MutationOutcome) -> Result<(), InternalError> {
        Ok(())
    }

    fn after_success(&mut self, _outcome: &MutationOutcome) {}
}
