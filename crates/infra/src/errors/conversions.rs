//! Conversions from external infrastructure errors into domain errors.

use cadence_domain::CadenceError;
use image::ImageError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use tokio_postgres::Error as PgError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CadenceError);

impl From<InfraError> for CadenceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CadenceError> for InfraError {
    fn from(value: CadenceError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCadenceError {
    fn into_cadence(self) -> CadenceError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for SqlError {
    fn into_cadence(self) -> CadenceError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => CadenceError::Store("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        CadenceError::Store("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        CadenceError::Store("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        CadenceError::Store("foreign key constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 275) => {
                        CadenceError::InvalidInput(format!("check constraint failed: {message}"))
                    }
                    _ => CadenceError::Store(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CadenceError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                CadenceError::Store(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                CadenceError::Store(format!("invalid column type for '{name}': {ty}"))
            }
            RE::Utf8Error(..) => CadenceError::Store("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => CadenceError::Store(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => CadenceError::Store("invalid SQL query".into()),
            other => CadenceError::Store(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio_postgres::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for PgError {
    fn into_cadence(self) -> CadenceError {
        use tokio_postgres::error::SqlState;

        if self.is_closed() {
            return CadenceError::Store("postgres connection closed".into());
        }

        match self.code() {
            Some(state) if *state == SqlState::FOREIGN_KEY_VIOLATION => {
                CadenceError::Store("foreign key constraint violation".into())
            }
            Some(state) if *state == SqlState::UNIQUE_VIOLATION => {
                CadenceError::Store("unique constraint violation".into())
            }
            Some(state) if *state == SqlState::INVALID_PASSWORD => {
                CadenceError::Config("postgres rejected the configured credentials".into())
            }
            Some(state) => {
                CadenceError::Store(format!("postgres error {}: {}", state.code(), self))
            }
            None => CadenceError::Store(format!("postgres error: {self}")),
        }
    }
}

impl From<PgError> for InfraError {
    fn from(value: PgError) -> Self {
        InfraError(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for JsonError {
    fn into_cadence(self) -> CadenceError {
        use serde_json::error::Category;

        match self.classify() {
            Category::Syntax | Category::Eof => {
                CadenceError::Store(format!("malformed document JSON: {self}"))
            }
            Category::Data => CadenceError::Store(format!("document shape mismatch: {self}")),
            Category::Io => CadenceError::Internal(format!("JSON I/O failure: {self}")),
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_cadence())
    }
}

/* -------------------------------------------------------------------------- */
/* image::ImageError / std::io::Error → CadenceError */
/* -------------------------------------------------------------------------- */

impl IntoCadenceError for ImageError {
    fn into_cadence(self) -> CadenceError {
        match self {
            ImageError::IoError(err) => {
                CadenceError::Reporting(format!("failed to write chart: {err}"))
            }
            ImageError::Encoding(err) => {
                CadenceError::Reporting(format!("failed to encode chart: {err}"))
            }
            other => CadenceError::Reporting(format!("chart rendering failed: {other}")),
        }
    }
}

impl From<ImageError> for InfraError {
    fn from(value: ImageError) -> Self {
        InfraError(value.into_cadence())
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        use std::io::ErrorKind;

        InfraError(match value.kind() {
            ErrorKind::NotFound => CadenceError::NotFound(value.to_string()),
            ErrorKind::PermissionDenied => {
                CadenceError::Store(format!("permission denied: {value}"))
            }
            _ => CadenceError::Internal(format!("I/O error: {value}")),
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
