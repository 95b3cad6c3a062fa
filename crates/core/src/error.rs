// Central Error Type for the Application

use crate::query::PatchError;
use thiserror::Error;

/// Status code carried by a transient write conflict (serialization failure).
pub const TRANSIENT_CONFLICT_CODE: u16 = 40001;

/// Fixed message returned once the executor gives up.
pub const TRANSACTION_FAILED_MESSAGE: &str = "transaction failed after retrying";

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid patch: {0}")]
    Patch(#[from] PatchError),

    /// The store refused the unit of work because a concurrent transaction won.
    #[error("Transient conflict: {0}")]
    TransientConflict(String),

    #[error("{}", TRANSACTION_FAILED_MESSAGE)]
    TransactionFailed,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status/kind tag attached to every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Forbidden,
    TransientConflict,
    Cancelled,
    Internal,
}

impl ErrorKind {
    /// Numeric status for the kind. Only `TransientConflict` uses 40001.
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Duplicate => 409,
            ErrorKind::Cancelled => 499,
            ErrorKind::Internal => 500,
            ErrorKind::TransientConflict => TRANSIENT_CONFLICT_CODE,
        }
    }
}

/// How the retrying executor treats an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry the whole unit of work.
    Transient,
    /// Explicit application error, surface unchanged.
    Terminal,
    /// Raw infrastructure failure, never surfaced as-is.
    Unclassified,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::Patch(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Duplicate(_) => ErrorKind::Duplicate,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::TransientConflict(_) => ErrorKind::TransientConflict,
            AppError::Cancelled => ErrorKind::Cancelled,
            AppError::TransactionFailed
            | AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> u16 {
        self.kind().code()
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::TransientConflict(_) => ErrorClass::Transient,
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Duplicate(_)
            | AppError::Forbidden(_)
            | AppError::Patch(_)
            | AppError::TransactionFailed
            | AppError::Cancelled => ErrorClass::Terminal,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Serialization(_)
            | AppError::Config(_)
            | AppError::Internal(_) => ErrorClass::Unclassified,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_conflict_code() {
        let err = AppError::TransientConflict("database is locked".into());
        assert_eq!(err.code(), 40001);
        assert!(err.is_transient());
    }

    #[test]
    fn test_classification() {
        assert_eq!(AppError::NotFound("post".into()).class(), ErrorClass::Terminal);
        assert_eq!(AppError::Duplicate("vote".into()).class(), ErrorClass::Terminal);
        assert_eq!(
            AppError::Patch(PatchError::NothingToUpdate).class(),
            ErrorClass::Terminal
        );
        assert_eq!(AppError::Database("disk I/O".into()).class(), ErrorClass::Unclassified);
        assert_eq!(AppError::Internal("oops".into()).class(), ErrorClass::Unclassified);
    }

    #[test]
    fn test_transaction_failed_message_is_fixed() {
        assert_eq!(
            AppError::TransactionFailed.to_string(),
            "transaction failed after retrying"
        );
        assert_eq!(AppError::TransactionFailed.code(), 500);
    }
}
