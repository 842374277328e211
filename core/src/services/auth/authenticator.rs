//! Bearer token validation, issuance and single-use consumption

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::entities::token::{AuthToken, IssuedToken, TokenScope};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::token::TokenCodec;

/// Validates presented tokens against stored digests
///
/// Activation and permission checks are left to the caller; a successful
/// `authenticate` only proves the token is genuine, current and in scope.
pub struct Authenticator {
    /// Token digests
    tokens: Arc<dyn TokenRepository>,
    /// Token owners
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(tokens: Arc<dyn TokenRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Resolve the user owning `plaintext` for `required_scope`
    ///
    /// # Errors
    /// * `AuthError::InvalidCredentials` - Malformed, unknown, or owner no longer exists
    /// * `AuthError::Expired` - The token's expiry has passed
    /// * `AuthError::ScopeMismatch` - Token issued for another purpose
    pub async fn authenticate(&self, plaintext: &str, required_scope: TokenScope) -> DomainResult<User> {
        let token = self.validate(plaintext, required_scope).await?;
        self.owner_of(&token).await
    }

    /// Issue a new token for `user_id`, storing only its digest
    pub async fn issue(&self, user_id: i64, scope: TokenScope, ttl: Duration) -> DomainResult<IssuedToken> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DomainError::internal(format!("token ttl out of range: {}", e)))?;

        let plaintext = TokenCodec::generate();
        let token = AuthToken::new(TokenCodec::digest(&plaintext), user_id, Utc::now() + ttl, scope);

        self.tokens.insert(&token).await?;
        debug!(
            user_id,
            scope = %scope,
            token = %TokenCodec::fingerprint(&token.hash),
            "Issued token"
        );

        Ok(IssuedToken::new(plaintext, token))
    }

    /// Validate and delete a single-use token, returning its owner
    ///
    /// Deletion is conditional: when two requests race on the same token only
    /// the one whose delete removed the row succeeds, the other gets
    /// `InvalidCredentials`.
    pub async fn consume(&self, plaintext: &str, scope: TokenScope) -> DomainResult<User> {
        let token = self.validate(plaintext, scope).await?;

        if !self.tokens.delete_by_hash(&token.hash, scope).await? {
            debug!(
                token = %TokenCodec::fingerprint(&token.hash),
                "Token consumed concurrently"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        self.owner_of(&token).await
    }

    /// Run `apply` for the owner of a single-use token, then delete the token
    ///
    /// The token is only deleted after `apply` succeeded, so a failed attempt
    /// (an edit conflict, storage trouble) can be repeated with the same token.
    /// `apply` is expected to be a versioned update of the owner: that write
    /// is what settles two requests presenting the same token.
    ///
    /// # Errors
    /// The token failures of [`authenticate`](Self::authenticate), or whatever
    /// `apply` returns, in which case the token is left in place
    pub async fn redeem<T, E, F, Fut>(&self, plaintext: &str, scope: TokenScope, apply: F) -> Result<T, E>
    where
        F: FnOnce(User) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<DomainError>,
    {
        let token = self.validate(plaintext, scope).await?;
        let owner = self.owner_of(&token).await?;

        let applied = apply(owner).await?;

        if !self.tokens.delete_by_hash(&token.hash, scope).await? {
            debug!(
                token = %TokenCodec::fingerprint(&token.hash),
                "Token already removed by a concurrent redemption"
            );
        }
        Ok(applied)
    }

    /// Revoke every token of `user_id` in `scope`
    pub async fn revoke_all(&self, user_id: i64, scope: TokenScope) -> DomainResult<u64> {
        let revoked = self.tokens.delete_all_for_user(user_id, scope).await?;
        debug!(user_id, scope = %scope, revoked, "Revoked tokens");
        Ok(revoked)
    }

    async fn validate(&self, plaintext: &str, scope: TokenScope) -> DomainResult<AuthToken> {
        if !TokenCodec::is_well_formed(plaintext) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let hash = TokenCodec::digest(plaintext);
        let token = self
            .tokens
            .find_by_hash(&hash)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if token.is_expired_at(Utc::now()) {
            return Err(AuthError::Expired.into());
        }
        if token.scope != scope {
            return Err(AuthError::ScopeMismatch.into());
        }

        Ok(token)
    }

    async fn owner_of(&self, token: &AuthToken) -> DomainResult<User> {
        self.users
            .get(token.user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidCredentials.into())
    }
}
