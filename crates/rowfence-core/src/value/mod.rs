mod compare;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub(crate) use compare::{compare_order, values_equal};

///
/// Value
///
/// Dynamic column value stored in rows and carried by filter clauses.
///
/// Integers keep their sign family; comparisons across `Int` and `Uint`
/// are numeric, so `Int(1)` and `Uint(1)` compare equal.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Text(String),
    List(Vec<Self>),
}

impl Value {
    // ─────────────────────────────────────────────
    // INTROSPECTION
    // ─────────────────────────────────────────────

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }

    // ─────────────────────────────────────────────
    // SQL RENDERING
    // ─────────────────────────────────────────────

    /// Render this value as an inline SQL literal.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => v.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::List(items) => {
                let parts: Vec<_> = items.iter().map(Self::to_sql_literal).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}
