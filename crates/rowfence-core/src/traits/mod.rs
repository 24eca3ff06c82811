use crate::{
    db::{primitives::FilterExpr, store::Row},
    error::InternalError,
    key::Key,
    value::Value,
};

///
/// Path
///
/// Fully-qualified path for an entity or store marker.
///

pub trait Path {
    const PATH: &'static str;
}

///
/// EntityKind
///
/// Table-level definition of one persisted entity.
/// Record handles and executors are parameterised by it.
///

pub trait EntityKind: Path + 'static {
    /// Table name used in rendered SQL.
    const TABLE: &'static str;

    /// Column that uniquely identifies a row and addresses it in the store.
    const PRIMARY_KEY: &'static str;

    /// Every column the entity declares, primary key included.
    const FIELDS: &'static [&'static str];

    /// Restriction that scopes a mutation to the row a handle represents.
    ///
    /// Defaults to `PRIMARY_KEY = <row's key value>`.
    fn identity(row: &Row) -> Result<FilterExpr, InternalError> {
        let value = row.get(Self::PRIMARY_KEY);
        if Key::from_value(value).is_none() {
            return Err(InternalError::record_invariant(format!(
                "{} row has no usable primary key value in '{}' (found {})",
                Self::PATH,
                Self::PRIMARY_KEY,
                value.tag()
            )));
        }

        Ok(FilterExpr::eq(Self::PRIMARY_KEY, value.clone()))
    }

    /// Whether `field` is a declared column.
    #[must_use]
    fn has_field(field: &str) -> bool {
        Self::FIELDS.contains(&field)
    }
}

///
/// FieldValue
///
/// Conversion boundary for values used in query predicates and row writes.
///
/// Represents values that can appear on the *right-hand side* of predicates.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for Key {
    fn to_value(&self) -> Value {
        Self::to_value(self)
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

// impl_field_value
macro_rules! impl_field_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl FieldValue for $type {
                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }
            }
        )*
    };
}

impl_field_value!(
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
);
