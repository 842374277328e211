//! Read-modify-write without locks
//!
//! A writer states the version it read. The write only lands if the stored
//! version still equals it; otherwise the caller gets `EditConflict` and must
//! re-read. Concurrent edits are rejected, never merged.

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::domain::Versioned;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::VersionedRepository;

/// Optimistic concurrency wrapper around a [`VersionedRepository`]
pub struct VersionedStore<T, R: ?Sized> {
    repository: Arc<R>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R: ?Sized> Clone for VersionedStore<T, R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            _entity: PhantomData,
        }
    }
}

impl<T, R> VersionedStore<T, R>
where
    T: Versioned,
    R: VersionedRepository<T> + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }

    /// Current stored state of `id`
    pub async fn get(&self, id: i64) -> DomainResult<T> {
        check_id(id)?;
        self.repository
            .find_versioned(id)
            .await?
            .ok_or_else(|| DomainError::not_found(T::RESOURCE))
    }

    /// Apply `mutate` to `id` if its stored version is still `expected_version`
    ///
    /// # Returns
    /// The new version, always `expected_version + 1`
    ///
    /// # Errors
    /// * `InvalidId` - `id < 1`
    /// * `NotFound` - No such entity
    /// * `EditConflict` - Stored version differs, before or at write time
    /// * Any error returned by `mutate`, in which case nothing is written
    pub async fn update<F>(&self, id: i64, expected_version: i32, mutate: F) -> DomainResult<i32>
    where
        F: FnOnce(&mut T) -> DomainResult<()> + Send,
    {
        self.update_entity(id, expected_version, mutate)
            .await
            .map(|entity| entity.version())
    }

    /// Same as [`update`](Self::update) but returns the entity as written
    pub async fn update_entity<F>(&self, id: i64, expected_version: i32, mutate: F) -> DomainResult<T>
    where
        F: FnOnce(&mut T) -> DomainResult<()> + Send,
    {
        let mut entity = self.get(id).await?;

        // Fast path only; the conditional write below is what guarantees it
        if entity.version() != expected_version {
            debug!(
                resource = T::RESOURCE,
                id,
                expected_version,
                stored_version = entity.version(),
                "Stale version"
            );
            return Err(DomainError::EditConflict);
        }

        mutate(&mut entity)?;

        if !self.repository.update_if_version(&entity, expected_version).await? {
            debug!(resource = T::RESOURCE, id, expected_version, "Conditional write lost the race");
            return Err(DomainError::EditConflict);
        }

        entity.set_version(expected_version + 1);
        Ok(entity)
    }

    /// Unconditional delete
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        check_id(id)?;
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(T::RESOURCE))
        }
    }
}

fn check_id(id: i64) -> DomainResult<()> {
    if id < 1 {
        return Err(DomainError::InvalidId { id });
    }
    Ok(())
}
