//! In-memory TokenRepository used by tests and local runs without MySQL

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{AuthToken, TokenHash, TokenScope};
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository keyed by digest
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<TokenHash, AuthToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, token: &AuthToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        // Primary key on the digest
        if tokens.contains_key(&token.hash) {
            return Err(DomainError::internal("duplicate token digest"));
        }

        tokens.insert(token.hash, token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, hash: &TokenHash) -> Result<Option<AuthToken>, DomainError> {
        Ok(self.tokens.read().await.get(hash).cloned())
    }

    async fn delete_by_hash(&self, hash: &TokenHash, scope: TokenScope) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get(hash) {
            Some(token) if token.scope == scope => {
                tokens.remove(hash);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();

        tokens.retain(|_, t| !(t.user_id == user_id && t.scope == scope));

        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();

        tokens.retain(|_, t| !t.is_expired_at(now));

        Ok((before - tokens.len()) as u64)
    }
}
