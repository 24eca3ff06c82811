mod hook;

pub use hook::{MutationHook, MutationOutcome};

use crate::{
    db::{
        Db,
        query::{DeleteQuery, MutationKind, UpdateQuery},
        record::FilterContext,
    },
    error::InternalError,
    traits::EntityKind,
};
use std::marker::PhantomData;

///
/// MutationExecutor
///
/// Runs one delete or update through the registered hooks:
/// rewrite, render, stage, verify, commit, notify.
/// A failed verify leaves the store untouched.
///

pub struct MutationExecutor<'h, E: EntityKind> {
    db: Db,
    debug: bool,
    hooks: Vec<&'h mut dyn MutationHook>,
    _marker: PhantomData<E>,
}

impl<'h, E: EntityKind> MutationExecutor<'h, E> {
    #[must_use]
    pub fn new(db: Db) -> Self {
        let debug = db.config().executor.debug;

        Self {
            db,
            debug,
            hooks: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Register a hook; hooks run in registration order.
    #[must_use]
    pub fn hook(mut self, hook: &'h mut dyn MutationHook) -> Self {
        self.hooks.push(hook);
        self
    }

    // ─────────────────────────────────────────────
    // EXECUTION
    // ─────────────────────────────────────────────

    pub fn delete(
        &mut self,
        ctx: &FilterContext<'_>,
        query: DeleteQuery,
    ) -> Result<MutationOutcome, InternalError> {
        let query = self
            .hooks
            .iter()
            .fold(query, |query, hook| hook.rewrite_delete(ctx, query));

        let sql = query.to_sql(&self.db.renderer());
        let outcome = self.db.execute_delete_with::<E, _>(&query, |rows_affected| {
            self.verify(MutationKind::Delete, rows_affected, sql)
        })?;

        self.notify(&outcome);
        Ok(outcome)
    }

    pub fn update(
        &mut self,
        ctx: &FilterContext<'_>,
        query: UpdateQuery,
    ) -> Result<MutationOutcome, InternalError> {
        let query = self
            .hooks
            .iter()
            .fold(query, |query, hook| hook.rewrite_update(ctx, query));

        let sql = query.to_sql(&self.db.renderer());
        let outcome = self.db.execute_update_with::<E, _>(&query, |rows_affected| {
            self.verify(MutationKind::Update, rows_affected, sql)
        })?;

        self.notify(&outcome);
        Ok(outcome)
    }

    // Runs before the engine commits; an error here leaves the store untouched.
    fn verify(
        &self,
        kind: MutationKind,
        rows_affected: u64,
        sql: String,
    ) -> Result<MutationOutcome, InternalError> {
        let outcome = MutationOutcome {
            kind,
            entity_path: E::PATH,
            rows_affected,
            sql,
        };

        if self.debug {
            tracing::debug!(
                entity = E::PATH,
                %kind,
                rows_affected,
                sql = %outcome.sql,
                "mutation executed"
            );
        }

        for hook in &self.hooks {
            hook.verify(&outcome)?;
        }

        Ok(outcome)
    }

    fn notify(&mut self, outcome: &MutationOutcome) {
        for hook in &mut self.hooks {
            hook.after_success(outcome);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{
            primitives::{FilterExpr, FilterExt},
            store::Row,
        },
        error::ErrorClass,
        key::Key,
        test_support::{Item, item},
    };
    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        restriction: FilterExpr,
        reject: bool,
        log: Log,
    }

    impl Recorder {
        fn new(tag: &'static str, restriction: FilterExpr, log: &Log) -> Self {
            Self {
                tag,
                restriction,
                reject: false,
                log: Rc::clone(log),
            }
        }
    }

    impl MutationHook for Recorder {
        fn rewrite_delete(&self, _ctx: &FilterContext<'_>, query: DeleteQuery) -> DeleteQuery {
            self.log.borrow_mut().push(format!("{}:rewrite", self.tag));
            query.filter(self.restriction.clone())
        }

        fn verify(&self, outcome: &MutationOutcome) -> Result<(), InternalError> {
            self.log.borrow_mut().push(format!("{}:verify", self.tag));
            if self.reject {
                return Err(InternalError::query_invariant(format!(
                    "rejected {} rows",
                    outcome.rows_affected
                )));
            }
            Ok(())
        }

        fn after_success(&mut self, outcome: &MutationOutcome) {
            self.log
                .borrow_mut()
                .push(format!("{}:success:{}", self.tag, outcome.kind));
        }
    }

    fn seeded() -> (Db, Row) {
        let db = Db::new();
        let row = item(1, true);
        db.insert::<Item>(row.clone())
            .expect("seed insert should succeed");
        db.insert::<Item>(item(2, false))
            .expect("seed insert should succeed");
        (db, row)
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let (db, row) = seeded();
        let log = Log::default();
        let mut first = Recorder::new("a", FilterExpr::eq("a", 1), &log);
        let mut second = Recorder::new("b", FilterExpr::eq("b", 2), &log);

        let ctx = FilterContext::new::<Item>(MutationKind::Delete, &row);
        let outcome = MutationExecutor::<Item>::new(db.clone())
            .hook(&mut first)
            .hook(&mut second)
            .delete(&ctx, DeleteQuery::for_entity::<Item>().filter(FilterExpr::eq("id", 1)))
            .expect("delete should succeed");

        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(
            outcome.sql,
            r#"DELETE FROM "items" WHERE "id" = 1 AND "a" = 1 AND "b" = 2"#
        );
        assert_eq!(
            *log.borrow(),
            [
                "a:rewrite",
                "b:rewrite",
                "a:verify",
                "b:verify",
                "a:success:delete",
                "b:success:delete",
            ]
        );
        assert!(db.get::<Item>(&Key::Int(1)).is_none());
    }

    #[test]
    fn failed_verify_skips_success_notifications() {
        let (db, row) = seeded();
        let log = Log::default();
        let mut first = Recorder::new("a", FilterExpr::True, &log);
        let mut second = Recorder::new("b", FilterExpr::True, &log);
        first.reject = true;

        let ctx = FilterContext::new::<Item>(MutationKind::Delete, &row);
        let err = MutationExecutor::<Item>::new(db.clone())
            .hook(&mut first)
            .hook(&mut second)
            .delete(&ctx, DeleteQuery::for_entity::<Item>().filter(FilterExpr::eq("id", 1)))
            .expect_err("verify should reject");

        assert_eq!(err.class, ErrorClass::InvariantViolation);
        assert_eq!(*log.borrow(), ["a:rewrite", "b:rewrite", "a:verify"]);
        assert!(
            db.get::<Item>(&Key::Int(1)).is_some(),
            "rejected delete removes nothing"
        );
    }

    #[test]
    fn engine_errors_propagate_before_verify() {
        let (db, row) = seeded();
        let log = Log::default();
        let mut hook = Recorder::new("a", FilterExpr::True, &log);

        let ctx = FilterContext::new::<Item>(MutationKind::Update, &row);
        let err = MutationExecutor::<Item>::new(db)
            .hook(&mut hook)
            .update(&ctx, UpdateQuery::for_entity::<Item>().set("colour", "red"))
            .expect_err("unknown column should fail");

        assert_eq!(err.class, ErrorClass::Unsupported);
        assert!(log.borrow().is_empty(), "default rewrite_update is a no-op");
    }

    #[test]
    fn update_without_hooks_reports_sql() {
        let (db, row) = seeded();

        let ctx = FilterContext::new::<Item>(MutationKind::Update, &row);
        let outcome = MutationExecutor::<Item>::new(db)
            .debug()
            .update(
                &ctx,
                UpdateQuery::for_entity::<Item>()
                    .set("name", "x")
                    .filter(FilterExpr::eq("id", 1)),
            )
            .expect("update should succeed");

        assert_eq!(outcome.kind, MutationKind::Update);
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.sql, r#"UPDATE "items" SET "name" = 'x' WHERE "id" = 1"#);
    }
}
