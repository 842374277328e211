//! MySQL implementation of the TokenRepository trait.
//!
//! Only the SHA-256 digest of a token is stored, as a `BINARY(32)` primary
//! key. Consumption of single-use tokens relies on `DELETE ... WHERE hash = ?
//! AND scope = ?` reporting exactly one affected row to a single caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use mq_core::domain::entities::token::{AuthToken, TokenHash, TokenScope};
use mq_core::errors::DomainError;
use mq_core::repositories::TokenRepository;

use crate::database::{is_unique_violation, storage_error};

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to AuthToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<AuthToken, DomainError> {
        let hash: Vec<u8> = row
            .try_get("hash")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get hash: {}", e) })?;
        let hash: TokenHash = hash.try_into().map_err(|raw: Vec<u8>| DomainError::Internal {
            message: format!("Stored token hash has {} bytes", raw.len()),
        })?;

        let scope: String = row
            .try_get("scope")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get scope: {}", e) })?;

        Ok(AuthToken {
            hash,
            user_id: row
                .try_get("user_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get user_id: {}", e) })?,
            expiry: row
                .try_get::<DateTime<Utc>, _>("expiry")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get expiry: {}", e) })?,
            scope: scope.parse().map_err(|message| DomainError::Internal { message })?,
        })
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn insert(&self, token: &AuthToken) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES (?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&token.hash[..])
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Internal { message: "Token hash collision".to_string() }
                } else {
                    storage_error("Failed to save token", e)
                }
            })?;

        Ok(())
    }

    async fn find_by_hash(&self, hash: &TokenHash) -> Result<Option<AuthToken>, DomainError> {
        let query = r#"
            SELECT hash, user_id, expiry, scope
            FROM tokens
            WHERE hash = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(&hash[..])
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find token", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_hash(&self, hash: &TokenHash, scope: TokenScope) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE hash = ? AND scope = ?")
            .bind(&hash[..])
            .bind(scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = ? AND scope = ?")
            .bind(user_id)
            .bind(scope.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to revoke user tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expiry <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete expired tokens", e))?;

        Ok(result.rows_affected())
    }
}
