mod instance_filter;


pub use instance_filter::{
    DynamicRestriction, FilterPredicate, InstanceFilterMismatch, InstanceFilterSet,
};

use crate::{
    db::{
        Db,
        executor::{MutationExecutor, MutationOutcome},
        primitives::{FilterExpr, FilterExt, IntoFilterExpr},
        query::{DeleteQuery, MutationKind, UpdateQuery},
        store::Row,
    },
    error::InternalError,
    key::Key,
    traits::{EntityKind, FieldValue},
    value::Value,
};
use std::{fmt, marker::PhantomData, rc::Rc};

///
/// FilterContext
///
/// Query-building context handed to dynamic restrictions.
///

#[derive(Clone, Copy, Debug)]
pub struct FilterContext<'a> {
    entity_path: &'static str,
    table: &'static str,
    primary_key: &'static str,
    kind: MutationKind,
    row: &'a Row,
}

impl<'a> FilterContext<'a> {
    #[must_use]
    pub const fn new<E: EntityKind>(kind: MutationKind, row: &'a Row) -> Self {
        Self {
            entity_path: E::PATH,
            table: E::TABLE,
            primary_key: E::PRIMARY_KEY,
            kind,
            row,
        }
    }

    #[must_use]
    pub const fn entity_path(&self) -> &'static str {
        self.entity_path
    }

    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    #[must_use]
    pub const fn primary_key(&self) -> &'static str {
        self.primary_key
    }

    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        self.kind
    }

    /// The handle's row as it was when the statement was built.
    #[must_use]
    pub const fn row(&self) -> &'a Row {
        self.row
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &'a Value {
        self.row.get(field)
    }
}

///
/// Record
///
/// Handle to one persisted row of `E`.
///
/// Each handle owns its own [`InstanceFilterSet`]; handles loaded separately
/// for the same row never share filters.
///

pub struct Record<E: EntityKind> {
    db: Db,
    row: Row,
    filters: InstanceFilterSet,
    _marker: PhantomData<E>,
}

impl<E: EntityKind> Record<E> {
    const fn from_parts(db: Db, row: Row) -> Self {
        Self {
            db,
            row,
            filters: InstanceFilterSet::new(),
            _marker: PhantomData,
        }
    }

    // ─────────────────────────────────────────────
    // LOADING
    // ─────────────────────────────────────────────

    /// Persist `row` and return a handle to it.
    pub fn insert(db: &Db, row: Row) -> Result<Self, InternalError> {
        db.insert::<E>(row.clone())?;

        Ok(Self::from_parts(db.clone(), row))
    }

    pub fn load(db: &Db, key: impl Into<Key>) -> Result<Self, InternalError> {
        let key = key.into();

        Self::try_load(db, key.clone())
            .ok_or_else(|| InternalError::store_not_found(format!("{}:{key}", E::PATH)))
    }

    #[must_use]
    pub fn try_load(db: &Db, key: impl Into<Key>) -> Option<Self> {
        db.get::<E>(&key.into())
            .map(|row| Self::from_parts(db.clone(), row))
    }

    /// Re-read the row from the store. Instance filters are kept.
    pub fn refresh(&mut self) -> Result<(), InternalError> {
        let key = self.key()?;
        self.row = self
            .db
            .get::<E>(&key)
            .ok_or_else(|| InternalError::store_not_found(format!("{}:{key}", E::PATH)))?;

        Ok(())
    }

    // ─────────────────────────────────────────────
    // ACCESSORS
    // ─────────────────────────────────────────────

    #[must_use]
    pub const fn row(&self) -> &Row {
        &self.row
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &Value {
        self.row.get(field)
    }

    pub fn key(&self) -> Result<Key, InternalError> {
        let value = self.row.get(E::PRIMARY_KEY);

        Key::from_value(value).ok_or_else(|| {
            InternalError::record_invariant(format!(
                "{} handle has no usable primary key in '{}' (found {})",
                E::PATH,
                E::PRIMARY_KEY,
                value.tag()
            ))
        })
    }

    // ─────────────────────────────────────────────
    // INSTANCE FILTERS
    // ─────────────────────────────────────────────

    /// Restrict this handle's next delete or update.
    pub fn instance_filter(&mut self, restriction: impl IntoFilterExpr) -> &mut Self {
        self.filters.add(restriction, None);
        self
    }

    /// Restriction plus a dynamic part evaluated when the statement is built.
    pub fn instance_filter_with(
        &mut self,
        restriction: impl IntoFilterExpr,
        dynamic: impl Fn(&FilterContext<'_>) -> FilterExpr + 'static,
    ) -> &mut Self {
        self.filters.add(restriction, Some(Rc::new(dynamic)));
        self
    }

    pub fn instance_filter_fn(
        &mut self,
        dynamic: impl Fn(&FilterContext<'_>) -> FilterExpr + 'static,
    ) -> &mut Self {
        self.filters.add_dynamic(dynamic);
        self
    }

    #[must_use]
    pub const fn instance_filters(&self) -> &InstanceFilterSet {
        &self.filters
    }

    // ─────────────────────────────────────────────
    // STATEMENTS
    // ─────────────────────────────────────────────

    /// The delete this handle would execute right now.
    pub fn delete_query(&self) -> Result<DeleteQuery, InternalError> {
        let ctx = FilterContext::new::<E>(MutationKind::Delete, &self.row);

        Ok(self.filters.apply(&ctx, self.identity_delete()?))
    }

    /// The update this handle would execute right now for `changes`.
    pub fn update_query<I, K, V>(&self, changes: I) -> Result<UpdateQuery, InternalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        let ctx = FilterContext::new::<E>(MutationKind::Update, &self.row);

        Ok(self.filters.apply(&ctx, self.identity_update(changes)?))
    }

    fn identity_delete(&self) -> Result<DeleteQuery, InternalError> {
        Ok(DeleteQuery::for_entity::<E>().filter(E::identity(&self.row)?))
    }

    fn identity_update<I, K, V>(&self, changes: I) -> Result<UpdateQuery, InternalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        Ok(UpdateQuery::for_entity::<E>()
            .set_all(changes)
            .filter(E::identity(&self.row)?))
    }

    // ─────────────────────────────────────────────
    // MUTATIONS
    // ─────────────────────────────────────────────

    /// Delete the row, narrowed by this handle's instance filters.
    ///
    /// Fails with an instance filter mismatch unless exactly one row was
    /// removed; filters are cleared only on success.
    pub fn delete(&mut self) -> Result<MutationOutcome, InternalError> {
        let base = self.identity_delete()?;
        let ctx = FilterContext::new::<E>(MutationKind::Delete, &self.row);

        MutationExecutor::<E>::new(self.db.clone())
            .hook(&mut self.filters)
            .delete(&ctx, base)
    }

    /// Write `changes` to the row, narrowed by this handle's instance filters.
    ///
    /// On success the handle's row reflects the written values.
    pub fn update<I, K, V>(&mut self, changes: I) -> Result<MutationOutcome, InternalError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: FieldValue,
    {
        let base = self.identity_update(changes)?;
        let written = base.set.clone();

        let outcome = {
            let ctx = FilterContext::new::<E>(MutationKind::Update, &self.row);
            MutationExecutor::<E>::new(self.db.clone())
                .hook(&mut self.filters)
                .update(&ctx, base)?
        };

        for (field, value) in written {
            self.row.set(field, value);
        }

        Ok(outcome)
    }
}

impl<E: EntityKind> Clone for Record<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            row: self.row.clone(),
            filters: self.filters.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: EntityKind> fmt::Debug for Record<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("entity", &E::PATH)
            .field("row", &self.row)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
