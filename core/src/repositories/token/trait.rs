//! Token repository trait defining the interface for bearer token persistence.

use async_trait::async_trait;

use crate::domain::entities::token::{AuthToken, TokenHash, TokenScope};
use crate::errors::DomainError;

/// Repository trait for AuthToken persistence operations
///
/// # Security Considerations
/// - Only digests are stored; lookups are by digest alone, never by user id
/// - `delete_by_hash` is the single-use consumption primitive and must be a
///   conditional delete so that exactly one concurrent consumer wins
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a new token digest
    async fn insert(&self, token: &AuthToken) -> Result<(), DomainError>;

    /// Find a token by its digest
    ///
    /// # Returns
    /// * `Ok(Some(AuthToken))` - Token found (it may be expired)
    /// * `Ok(None)` - No token with this digest
    async fn find_by_hash(&self, hash: &TokenHash) -> Result<Option<AuthToken>, DomainError>;

    /// Delete one token if it exists with the given scope
    ///
    /// # Returns
    /// * `Ok(true)` - This call deleted the token
    /// * `Ok(false)` - Nothing matched (already consumed or never existed)
    async fn delete_by_hash(&self, hash: &TokenHash, scope: TokenScope) -> Result<bool, DomainError>;

    /// Delete every token of a user in one scope
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of tokens deleted
    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<u64, DomainError>;

    /// Delete expired tokens; called periodically by the cleanup task
    async fn delete_expired(&self) -> Result<u64, DomainError>;
}
