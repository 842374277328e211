//! User repository trait defining the interface for account persistence.

use async_trait::async_trait;

use crate::domain::entities::user::{NewUser, User};
use crate::errors::DomainError;
use crate::repositories::versioned::VersionedRepository;

/// Repository trait for User entity persistence operations
///
/// Account changes (activation, password) are versioned updates so that two
/// concurrent edits of the same account cannot silently overwrite each other.
#[async_trait]
pub trait UserRepository: VersionedRepository<User> {
    /// Insert a new user with `activated = false` and version 1
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::DuplicateEmail)` - The email address is already registered
    async fn insert(&self, new_user: &NewUser) -> Result<User, DomainError>;

    /// Find a user by id
    async fn get(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Find a user by (normalized) email address
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}
