//! Error types shared by the services
//!
//! Database failures are reported as [`DatabaseError`]; services wrap it in
//! their own error types at the boundary.

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Could not open a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Invalid settings, detected before connecting
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// SQLSTATE of the underlying database error, if any
    pub fn sql_state(&self) -> Option<String> {
        match self {
            DatabaseError::Connection(err) | DatabaseError::Query(err) => err
                .as_database_error()
                .and_then(|db| db.code())
                .map(|code| code.into_owned()),
            _ => None,
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
