//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use mq_core::domain::entities::user::{NewUser, User};
use mq_core::errors::DomainError;
use mq_core::repositories::{UserRepository, VersionedRepository};

use crate::database::{is_unique_violation, storage_error};

macro_rules! select_user {
    () => {
        "SELECT id, created_at, name, email, password_hash, activated, version FROM users"
    };
}

/// MySQL implementation of UserRepository
///
/// Email uniqueness is enforced by the `users_email_unique` index; a
/// violation surfaces as [`DomainError::DuplicateEmail`].
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let decode = |column: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", column, e),
        };

        Ok(User {
            id: row.try_get("id").map_err(|e| decode("id", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| decode("created_at", e))?,
            name: row.try_get("name").map_err(|e| decode("name", e))?,
            email: row.try_get("email").map_err(|e| decode("email", e))?,
            password_hash: row.try_get("password_hash").map_err(|e| decode("password_hash", e))?,
            activated: row.try_get("activated").map_err(|e| decode("activated", e))?,
            version: row.try_get("version").map_err(|e| decode("version", e))?,
        })
    }

    fn write_error(context: &str, error: sqlx::Error) -> DomainError {
        if is_unique_violation(&error) {
            DomainError::DuplicateEmail
        } else {
            storage_error(context, error)
        }
    }
}

#[async_trait]
impl VersionedRepository<User> for MySqlUserRepository {
    async fn find_versioned(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(concat!(select_user!(), " WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find user", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn update_if_version(&self, user: &User, expected_version: i32) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE users
            SET name = ?, email = ?, password_hash = ?, activated = ?, version = version + 1
            WHERE id = ? AND version = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .bind(user.id)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("Failed to update user", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (name, email, password_hash, activated, version)
            VALUES (?, ?, ?, FALSE, 1)
        "#;

        let result = sqlx::query(query)
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("Failed to insert user", e))?;

        let id = result.last_insert_id() as i64;
        tracing::debug!(user_id = id, "User inserted");

        self.get(id).await?.ok_or_else(|| DomainError::Internal {
            message: format!("Inserted user {} could not be read back", id),
        })
    }

    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.find_versioned(id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(concat!(select_user!(), " WHERE email = ?"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find user by email", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}
