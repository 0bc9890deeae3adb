use std::time::Duration;

use thiserror::Error;

use crate::family::{DatabaseFamily, FieldName};

/// Why a field failed client-side validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Required,
}

/// A field-scoped input error. Recoverable by re-editing; the backend
/// is never called while any of these are outstanding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: FieldName,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn required(field: FieldName) -> Self {
        Self {
            field,
            reason: ValidationReason::Required,
        }
    }
}

/// Errors that can occur on the backend command surface
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("{0}")]
    Failed(String),
    #[error("connection timeout after {0:?}")]
    Timeout(Duration),
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("{0} connections are not implemented yet")]
    Unsupported(DatabaseFamily),
}

/// Errors from the profile store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt profile record: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("could not find local data directory")]
    DataDir,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
