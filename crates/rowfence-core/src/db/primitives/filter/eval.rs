use crate::{
    db::{
        primitives::filter::{Cmp, FilterClause, FilterExpr},
        store::Row,
    },
    value::{Value, compare_order, values_equal},
};
use std::cmp::Ordering;

///
/// FilterEvaluator
///
/// Evaluates a filter against one stored row with SQL three-valued logic.
/// Missing columns read as `Null`. A comparison against `Null` is unknown
/// except through `IsNull` (or `Eq`/`Ne` with a `Null` operand); unknown
/// propagates through `And`, `Or` and `Not`, and only a definite `true`
/// selects the row.
///

pub(crate) struct FilterEvaluator<'r> {
    row: &'r Row,
}

impl<'r> FilterEvaluator<'r> {
    pub(crate) const fn new(row: &'r Row) -> Self {
        Self { row }
    }

    /// True when the row is selected by `expr`.
    pub(crate) fn matches(&self, expr: &FilterExpr) -> bool {
        self.eval(expr) == Some(true)
    }

    /// `None` is SQL's unknown.
    pub(crate) fn eval(&self, expr: &FilterExpr) -> Option<bool> {
        match expr {
            FilterExpr::True => Some(true),
            FilterExpr::False => Some(false),
            FilterExpr::Clause(c) => self.eval_clause(c),
            FilterExpr::And(children) => {
                let mut unknown = false;
                for child in children {
                    match self.eval(child) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                (!unknown).then_some(true)
            }
            FilterExpr::Or(children) => {
                let mut unknown = false;
                for child in children {
                    match self.eval(child) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                (!unknown).then_some(false)
            }
            FilterExpr::Not(inner) => self.eval(inner).map(|b| !b),
        }
    }

    fn eval_clause(&self, clause: &FilterClause) -> Option<bool> {
        let actual = self.row.get(&clause.field);
        let expected = &clause.value;

        match clause.cmp {
            Cmp::Eq if expected.is_null() => Some(actual.is_null()),
            Cmp::Ne if expected.is_null() => Some(!actual.is_null()),
            Cmp::IsNull => Some(actual.is_null()),
            Cmp::IsNotNull => Some(!actual.is_null()),
            Cmp::In if Self::is_empty_list(expected) => Some(false),
            Cmp::NotIn if Self::is_empty_list(expected) => Some(true),
            _ if actual.is_null() => None,
            Cmp::Eq => Some(values_equal(actual, expected)),
            Cmp::Ne => Some(!values_equal(actual, expected)),
            Cmp::Lt => Self::order(actual, expected, |o| o == Ordering::Less),
            Cmp::Lte => Self::order(actual, expected, |o| o != Ordering::Greater),
            Cmp::Gt => Self::order(actual, expected, |o| o == Ordering::Greater),
            Cmp::Gte => Self::order(actual, expected, |o| o != Ordering::Less),
            Cmp::In => Self::membership(actual, expected),
            Cmp::NotIn => Self::membership(actual, expected).map(|found| !found),
            Cmp::Contains => Self::text(actual, expected, |a, b| a.contains(b)),
            Cmp::StartsWith => Self::text(actual, expected, |a, b| a.starts_with(b)),
            Cmp::EndsWith => Self::text(actual, expected, |a, b| a.ends_with(b)),
        }
    }

    // Incomparable values are unknown.
    fn order(actual: &Value, expected: &Value, op: impl Fn(Ordering) -> bool) -> Option<bool> {
        compare_order(actual, expected).map(op)
    }

    // Empty lists render as constants, so they decide even a null column.
    const fn is_empty_list(value: &Value) -> bool {
        matches!(value, Value::List(items) if items.is_empty())
    }

    // A scalar operand is a one-element list, matching how it renders.
    // No match against a list holding `Null` is unknown.
    fn membership(actual: &Value, expected: &Value) -> Option<bool> {
        let items = match expected {
            Value::List(items) => items.as_slice(),
            scalar => std::slice::from_ref(scalar),
        };

        if items.iter().any(|item| values_equal(actual, item)) {
            Some(true)
        } else if items.iter().any(Value::is_null) {
            None
        } else {
            Some(false)
        }
    }

    fn text(actual: &Value, expected: &Value, op: impl Fn(&str, &str) -> bool) -> Option<bool> {
        match (actual.as_text(), expected.as_text()) {
            (Some(a), Some(b)) => Some(op(a, b)),
            _ => None,
        }
    }
}

///
/// TESTS
///
