mod eval;
mod expr;

use crate::{traits::FieldValue, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// re-exports
pub(crate) use eval::FilterEvaluator;
pub use expr::{FilterClause, FilterExpr};

///
/// Cmp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl Cmp {
    /// SQL operator token, for the comparisons that render as one.
    #[must_use]
    pub const fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Contains | Self::StartsWith | Self::EndsWith => "LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

///
/// IntoFilterExpr
///
/// Restriction forms accepted wherever a filter is conjoined.
///
/// Column→value mappings expand to a conjunction of equalities in
/// iteration order; an empty mapping is the neutral `True`.
///

pub trait IntoFilterExpr {
    fn into_expr(self) -> FilterExpr;
}

impl IntoFilterExpr for FilterExpr {
    fn into_expr(self) -> FilterExpr {
        self
    }
}

impl<V: FieldValue> IntoFilterExpr for (&str, V) {
    fn into_expr(self) -> FilterExpr {
        FilterExpr::eq(self.0, self.1)
    }
}

impl<V: FieldValue, const N: usize> IntoFilterExpr for [(&str, V); N] {
    fn into_expr(self) -> FilterExpr {
        conjoin_pairs(self.into_iter().map(|(field, value)| (field.to_string(), value.to_value())))
    }
}

impl<K: Into<String>, V: FieldValue> IntoFilterExpr for Vec<(K, V)> {
    fn into_expr(self) -> FilterExpr {
        conjoin_pairs(self.into_iter().map(|(field, value)| (field.into(), value.to_value())))
    }
}

impl IntoFilterExpr for BTreeMap<String, Value> {
    fn into_expr(self) -> FilterExpr {
        conjoin_pairs(self)
    }
}

fn conjoin_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> FilterExpr {
    pairs
        .into_iter()
        .map(|(field, value)| FilterExpr::eq(field, value))
        .fold(FilterExpr::True, FilterExpr::and_neutral)
}

///
/// FilterSlot
///
/// Access to the filter a statement carries.
///

pub trait FilterSlot {
    fn filter_slot(&mut self) -> &mut FilterExpr;
}

///
/// FilterExt
///
/// Conjunctive narrowing for any statement with a filter slot.
///

pub trait FilterExt: FilterSlot + Sized {
    /// Conjoin `restriction` after the existing filter.
    ///
    /// A neutral `True` leaves the statement untouched.
    #[must_use]
    fn filter(mut self, restriction: impl IntoFilterExpr) -> Self {
        let slot = self.filter_slot();
        *slot = std::mem::take(slot).and_neutral(restriction.into_expr());
        self
    }
}

impl<T: FilterSlot> FilterExt for T {}
