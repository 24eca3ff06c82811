use derive_more::Display;
use rowfence_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_instance_filter_mismatch(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Record(RecordErrorKind::InstanceFilterMismatch)
        )
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = if err.is_instance_filter_mismatch() {
            ErrorKind::Record(RecordErrorKind::InstanceFilterMismatch)
        } else {
            match (err.class, err.origin) {
                (ErrorClass::NotFound, _) => ErrorKind::Store(StoreErrorKind::NotFound),
                (ErrorClass::Conflict, CoreErrorOrigin::Store) => {
                    ErrorKind::Store(StoreErrorKind::DuplicateKey)
                }
                (ErrorClass::Unsupported, CoreErrorOrigin::Query) => {
                    ErrorKind::Query(QueryErrorKind::Unsupported)
                }
                (ErrorClass::InvariantViolation, CoreErrorOrigin::Query) => {
                    ErrorKind::Query(QueryErrorKind::Invalid)
                }
                _ => ErrorKind::Internal,
            }
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),
    Record(RecordErrorKind),
    Store(StoreErrorKind),

    /// Configuration could not be read or parsed.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Statement is bound to the wrong table.
    Invalid,

    /// Unknown column, missing key value, or an update writing nothing.
    Unsupported,
}

///
/// RecordErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RecordErrorKind {
    /// A record mutation did not affect exactly one row.
    /// The message carries the SQL that was executed.
    InstanceFilterMismatch,
}

///
/// StoreErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StoreErrorKind {
    NotFound,
    DuplicateKey,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Query,
    Record,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Record => Self::Record,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rowfence_core::{
        config::RowfenceConfig,
        db::{query::MutationKind, record::InstanceFilterMismatch},
    };

    #[test]
    fn mismatch_maps_to_record_kind() {
        let err: Error = InternalError::from(InstanceFilterMismatch {
            kind: MutationKind::Delete,
            rows_affected: 0,
            sql: r#"DELETE FROM "items" WHERE "id" = 1"#.to_string(),
        })
        .into();

        assert!(err.is_instance_filter_mismatch());
        assert_eq!(err.origin, ErrorOrigin::Record);
        assert!(err.message.contains(r#"WHERE "id" = 1"#));
    }

    #[test]
    fn not_found_maps_to_store_kind() {
        let err: Error = InternalError::store_not_found("items:1").into();

        assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::NotFound));
        assert_eq!(err.origin, ErrorOrigin::Store);
    }

    #[test]
    fn config_errors_map_to_config_kind() {
        let err: Error = RowfenceConfig::from_toml_str("[executor]\ndebug = 3\n")
            .expect_err("wrong type should fail")
            .into();

        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.origin.to_string(), "Config");
    }

    #[test]
    fn error_serializes_with_kind_and_origin() {
        let err = Error::new(
            ErrorKind::Record(RecordErrorKind::InstanceFilterMismatch),
            ErrorOrigin::Record,
            "instance filter mismatch",
        );

        let json = serde_json::to_value(&err).expect("error should serialize");
        assert_eq!(json["kind"]["Record"], "InstanceFilterMismatch");
        assert_eq!(json["origin"], "Record");

        let back: Error = serde_json::from_value(json).expect("error should deserialize");
        assert_eq!(back, err);
    }
}
