//! Core runtime for rowfence: values, entity traits, filter expressions,
//! mutation executors, record handles with instance filters, and the
//! observability surface.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            primitives::{Cmp, FilterClause, FilterExpr, IntoFilterExpr},
            record::{FilterContext, Record},
            store::Row,
        },
        key::Key,
        traits::{EntityKind, FieldValue, Path},
        value::Value,
    };
}
