//! Movie repository trait defining the interface for catalogue persistence.

use async_trait::async_trait;

use crate::domain::entities::movie::{Movie, MovieDraft};
use crate::errors::DomainError;
use crate::repositories::versioned::VersionedRepository;

/// Repository trait for Movie entity persistence operations
///
/// Updates and deletes go through [`VersionedRepository`]; this trait only adds
/// creation and plain reads.
#[async_trait]
pub trait MovieRepository: VersionedRepository<Movie> {
    /// Insert a new movie
    ///
    /// # Returns
    /// * `Ok(Movie)` - The stored movie with its generated id, `created_at` and version 1
    /// * `Err(DomainError)` - Insert failed
    async fn insert(&self, draft: &MovieDraft) -> Result<Movie, DomainError>;

    /// Find a movie by id
    ///
    /// # Returns
    /// * `Ok(Some(Movie))` - Movie found
    /// * `Ok(None)` - No movie with this id
    async fn get(&self, id: i64) -> Result<Option<Movie>, DomainError>;
}
