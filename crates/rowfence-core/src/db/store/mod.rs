mod row;

use crate::key::Key;
use std::collections::BTreeMap;

// re-exports
pub use row::Row;

///
/// DataStore
///
/// Rows of one entity, ordered by primary key.
///

#[derive(Debug, Default)]
pub(crate) struct DataStore {
    rows: BTreeMap<Key, Row>,
}

impl DataStore {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Row> {
        self.rows.get(key)
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.rows.contains_key(key)
    }

    pub(crate) fn insert(&mut self, key: Key, row: Row) -> Option<Row> {
        self.rows.insert(key, row)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Row> {
        self.rows.remove(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Row)> {
        self.rows.iter()
    }
}

///
/// StoreRegistry
///
/// One data store per entity path, created on first write.
///

#[derive(Debug, Default)]
pub(crate) struct StoreRegistry {
    stores: BTreeMap<&'static str, DataStore>,
}

impl StoreRegistry {
    pub(crate) fn store(&self, path: &'static str) -> Option<&DataStore> {
        self.stores.get(path)
    }

    pub(crate) fn store_mut(&mut self, path: &'static str) -> &mut DataStore {
        self.stores.entry(path).or_default()
    }
}
