//! Storage half of the optimistic concurrency protocol.

use async_trait::async_trait;

use crate::domain::Versioned;
use crate::errors::DomainResult;

/// Conditional persistence for a [`Versioned`] entity
///
/// Implementations must make `update_if_version` a single atomic
/// check-and-set: for SQL that is one statement of the form
/// `UPDATE … SET …, version = version + 1 WHERE id = ? AND version = ?`.
/// No lock may be held between `find_versioned` and `update_if_version`.
#[async_trait]
pub trait VersionedRepository<T: Versioned>: Send + Sync {
    /// Read the current row, including its version
    async fn find_versioned(&self, id: i64) -> DomainResult<Option<T>>;

    /// Write `entity` only if the stored version still equals `expected_version`
    ///
    /// # Returns
    /// * `Ok(true)` - Row written, stored version is now `expected_version + 1`
    /// * `Ok(false)` - No row matched (version moved on, or the row is gone)
    async fn update_if_version(&self, entity: &T, expected_version: i32) -> DomainResult<bool>;

    /// Unconditional delete
    ///
    /// # Returns
    /// * `Ok(true)` - Row deleted
    /// * `Ok(false)` - No such row
    async fn delete(&self, id: i64) -> DomainResult<bool>;
}
