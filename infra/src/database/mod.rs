//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - Repository implementations for movies, users and tokens
//! - The schema used by integration tests

pub mod connection;
pub mod migrations;
pub mod mysql;

#[cfg(test)]
mod tests;

use mq_core::errors::DomainError;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlMovieRepository, MySqlTokenRepository, MySqlUserRepository};

/// Map a sqlx error onto the domain taxonomy
///
/// Pool and transport failures are `StorageUnavailable` (503); anything else
/// is an internal error.
pub(crate) fn storage_error(context: &str, error: sqlx::Error) -> DomainError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            tracing::error!(error = %error, "{}: storage unavailable", context);
            DomainError::StorageUnavailable {
                message: format!("{}: {}", context, error),
            }
        }
        other => DomainError::Internal {
            message: format!("{}: {}", context, other),
        },
    }
}

/// True when the error is a unique-key violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}
