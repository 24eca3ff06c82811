//! Query-building primitives shared by every statement kind.

pub mod filter;

// re-exports
pub use filter::{Cmp, FilterClause, FilterExpr, FilterExt, FilterSlot, IntoFilterExpr};
pub(crate) use filter::FilterEvaluator;
