//! ## Crate layout
//! - `core`: runtime data model, filters, statements, executors, record
//!   handles and observability.
//! - `error`: public error taxonomy for callers.
//!
//! The `prelude` module carries the vocabulary needed to declare entities
//! and work with record handles.

pub use rowfence_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    config::RowfenceConfig,
    db::{Db, record::Record},
};
pub use error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        db::{
            Db,
            executor::MutationOutcome,
            primitives::{Cmp, FilterClause, FilterExpr, FilterExt as _, IntoFilterExpr},
            query::{DeleteQuery, MutationKind, UpdateQuery},
            record::{FilterContext, InstanceFilterSet, Record},
            store::Row,
        },
        key::Key,
        traits::{EntityKind, FieldValue, Path},
        value::Value,
    };
    pub use crate::{Error, RowfenceConfig};
}
