//! Test entities shared by unit tests across the crate.

use crate::{
    db::{primitives::FilterExpr, store::Row},
    error::InternalError,
    traits::{EntityKind, Path},
};

///
/// Item
///

pub(crate) struct Item;

impl Path for Item {
    const PATH: &'static str = "test_support::Item";
}

impl EntityKind for Item {
    const TABLE: &'static str = "items";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: &'static [&'static str] = &["id", "flag", "name", "a", "b"];
}

/// Item row with `a = 1` and `b = 2`.
pub(crate) fn item(id: i64, flag: bool) -> Row {
    Row::new()
        .with("id", id)
        .with("flag", flag)
        .with("name", format!("item-{id}"))
        .with("a", 1)
        .with("b", 2)
}

///
/// Tagged
///
/// Entity whose identity is a non-unique column, so a single handle
/// mutation can reach several rows.
///

pub(crate) struct Tagged;

impl Path for Tagged {
    const PATH: &'static str = "test_support::Tagged";
}

impl EntityKind for Tagged {
    const TABLE: &'static str = "tagged";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: &'static [&'static str] = &["id", "tag", "hits"];

    fn identity(row: &Row) -> Result<FilterExpr, InternalError> {
        Ok(FilterExpr::eq("tag", row.get("tag").clone()))
    }
}

pub(crate) fn tagged(id: i64, tag: &str) -> Row {
    Row::new().with("id", id).with("tag", tag).with("hits", 0)
}
