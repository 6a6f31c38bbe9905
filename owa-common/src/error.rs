//! Common error types for OWA

use thiserror::Error;

/// Common result type for OWA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Storage constraint that rejected a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// UNIQUE / PRIMARY KEY violation (duplicate entity, duplicate position)
    Unique,
    /// CHECK violation (negative position, owner/kind mismatch)
    Check,
    /// FOREIGN KEY violation
    ForeignKey,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintKind::Unique => write!(f, "unique"),
            ConstraintKind::Check => write!(f, "check"),
            ConstraintKind::ForeignKey => write!(f, "foreign key"),
        }
    }
}

/// Common error types across OWA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error that is not a constraint violation
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A storage constraint rejected the write
    #[error("Constraint violation ({kind}): {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (corrupt row, unexpected state)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for any storage constraint violation
    pub fn is_constraint(&self) -> bool {
        matches!(self, Error::Constraint { .. })
    }

    /// True for UNIQUE / PRIMARY KEY violations only
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Error::Constraint {
                kind: ConstraintKind::Unique,
                ..
            }
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        let kind = err.as_database_error().and_then(|db_err| match db_err.kind() {
            ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
            ErrorKind::CheckViolation => Some(ConstraintKind::Check),
            ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
            _ => None,
        });

        match kind {
            Some(kind) => Error::Constraint {
                kind,
                message: err.to_string(),
            },
            None => Error::Database(err),
        }
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::Internal(format!("Invalid UUID in storage: {}", err))
    }
}
