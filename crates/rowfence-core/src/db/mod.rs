//! Embedded single-threaded engine: stores, statements, executors and
//! record handles.

pub mod executor;
pub mod primitives;
pub mod query;
pub mod record;
pub mod store;

use crate::{
    config::RowfenceConfig,
    db::{
        primitives::FilterEvaluator,
        query::{DeleteQuery, MutationKind, QueryValidate, SqlRenderer, UpdateQuery},
        store::{Row, StoreRegistry},
    },
    error::InternalError,
    key::Key,
    obs::{MetricsEvent, sink},
    traits::EntityKind,
};
use std::{cell::RefCell, rc::Rc};

///
/// Db
///
/// Cheap, clonable handle to one in-memory database.
/// Clones share the same stores; the handle is deliberately `!Send`.
///

#[derive(Clone, Debug, Default)]
pub struct Db {
    stores: Rc<RefCell<StoreRegistry>>,
    config: Rc<RowfenceConfig>,
}

impl Db {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: RowfenceConfig) -> Self {
        Self {
            stores: Rc::default(),
            config: Rc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RowfenceConfig {
        &self.config
    }

    /// Renderer configured for this database's diagnostics.
    #[must_use]
    pub fn renderer(&self) -> SqlRenderer {
        SqlRenderer::new(&self.config.sql)
    }

    // ─────────────────────────────────────────────
    // ROW ACCESS
    // ─────────────────────────────────────────────

    /// Insert a new row, returning its primary key.
    pub fn insert<E: EntityKind>(&self, row: Row) -> Result<Key, InternalError> {
        query::validate_fields::<E>(row.columns())?;
        let key = Self::row_key::<E>(&row)?;

        let mut stores = self.stores.borrow_mut();
        let store = stores.store_mut(E::PATH);
        if store.contains(&key) {
            return Err(InternalError::store_duplicate_key(E::PATH, key.to_string()));
        }
        store.insert(key.clone(), row);

        Ok(key)
    }

    /// Fetch a copy of the row stored under `key`.
    #[must_use]
    pub fn get<E: EntityKind>(&self, key: &Key) -> Option<Row> {
        self.stores
            .borrow()
            .store(E::PATH)
            .and_then(|s| s.get(key))
            .cloned()
    }

    #[must_use]
    pub fn len<E: EntityKind>(&self) -> usize {
        self.stores.borrow().store(E::PATH).map_or(0, |s| s.len())
    }

    #[must_use]
    pub fn is_empty<E: EntityKind>(&self) -> bool {
        self.len::<E>() == 0
    }

    // ─────────────────────────────────────────────
    // STATEMENT EXECUTION
    // ─────────────────────────────────────────────

    /// Execute a delete and report how many rows it removed.
    pub fn execute_delete<E: EntityKind>(&self, query: &DeleteQuery) -> Result<u64, InternalError> {
        self.execute_delete_with::<E, _>(query, Ok)
    }

    /// Execute a delete, committing only if `check` accepts the number of
    /// matched rows. A rejected delete removes nothing.
    ///
    /// `check` runs while no store borrow is held and must not mutate this
    /// database.
    pub fn execute_delete_with<E, T>(
        &self,
        query: &DeleteQuery,
        check: impl FnOnce(u64) -> Result<T, InternalError>,
    ) -> Result<T, InternalError>
    where
        E: EntityKind,
    {
        QueryValidate::<E>::validate(query)?;
        sink::record(MetricsEvent::ExecStart {
            kind: MutationKind::Delete,
            entity_path: E::PATH,
        });

        let matched: Vec<Key> = self
            .stores
            .borrow()
            .store(E::PATH)
            .map(|store| {
                store
                    .iter()
                    .filter(|(_, row)| FilterEvaluator::new(row).matches(&query.filter))
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default();

        let rows_affected = matched.len() as u64;
        let accepted = check(rows_affected)?;

        let mut stores = self.stores.borrow_mut();
        let store = stores.store_mut(E::PATH);
        for key in &matched {
            store.remove(key);
        }

        sink::record(MetricsEvent::ExecFinish {
            kind: MutationKind::Delete,
            entity_path: E::PATH,
            rows_affected,
        });

        Ok(accepted)
    }

    /// Execute an update and report how many rows it modified.
    pub fn execute_update<E: EntityKind>(&self, query: &UpdateQuery) -> Result<u64, InternalError> {
        self.execute_update_with::<E, _>(query, Ok)
    }

    /// Execute an update, committing only if `check` accepts the number of
    /// matched rows.
    ///
    /// Writes that change the primary key re-key the row; any collision is
    /// rejected before `check` runs and before a single row is written.
    pub fn execute_update_with<E, T>(
        &self,
        query: &UpdateQuery,
        check: impl FnOnce(u64) -> Result<T, InternalError>,
    ) -> Result<T, InternalError>
    where
        E: EntityKind,
    {
        QueryValidate::<E>::validate(query)?;
        sink::record(MetricsEvent::ExecStart {
            kind: MutationKind::Update,
            entity_path: E::PATH,
        });

        let staged = self.stage_update::<E>(query)?;
        let rows_affected = staged.len() as u64;
        let accepted = check(rows_affected)?;

        let mut stores = self.stores.borrow_mut();
        let store = stores.store_mut(E::PATH);
        for (old, _, _) in &staged {
            store.remove(old);
        }
        for (_, new, row) in staged {
            store.insert(new, row);
        }

        sink::record(MetricsEvent::ExecFinish {
            kind: MutationKind::Update,
            entity_path: E::PATH,
            rows_affected,
        });

        Ok(accepted)
    }

    // (old key, new key, written row) for every matched row.
    fn stage_update<E: EntityKind>(
        &self,
        query: &UpdateQuery,
    ) -> Result<Vec<(Key, Key, Row)>, InternalError> {
        let stores = self.stores.borrow();
        let Some(store) = stores.store(E::PATH) else {
            return Ok(Vec::new());
        };

        let mut staged: Vec<(Key, Key, Row)> = Vec::new();
        for (key, row) in store.iter() {
            if !FilterEvaluator::new(row).matches(&query.filter) {
                continue;
            }

            let mut next = row.clone();
            for (field, value) in &query.set {
                next.set(field.clone(), value.clone());
            }
            let next_key = Self::row_key::<E>(&next)?;
            staged.push((key.clone(), next_key, next));
        }

        let vacated: Vec<&Key> = staged.iter().map(|(old, _, _)| old).collect();
        for (index, (old, new, _)) in staged.iter().enumerate() {
            if old == new {
                continue;
            }
            let taken_by_row = store.contains(new) && !vacated.contains(&new);
            let taken_by_batch = staged[..index].iter().any(|(_, other, _)| other == new);
            if taken_by_row || taken_by_batch {
                return Err(InternalError::store_duplicate_key(E::PATH, new.to_string()));
            }
        }

        Ok(staged)
    }

    fn row_key<E: EntityKind>(row: &Row) -> Result<Key, InternalError> {
        let value = row.get(E::PRIMARY_KEY);

        Key::from_value(value).ok_or_else(|| {
            InternalError::query_unsupported(format!(
                "{} primary key '{}' must be a non-null int, uint or text value (found {})",
                E::PATH,
                E::PRIMARY_KEY,
                value.tag()
            ))
        })
    }
}

///
/// TESTS
///
