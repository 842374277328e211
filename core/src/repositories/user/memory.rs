//! In-memory UserRepository used by tests and local runs without MySQL

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::{NewUser, User};
use crate::errors::DomainError;
use crate::repositories::versioned::VersionedRepository;

use super::r#trait::UserRepository;

#[derive(Default)]
struct Table {
    rows: HashMap<i64, User>,
    last_id: i64,
}

/// In-memory user repository
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionedRepository<User> for InMemoryUserRepository {
    async fn find_versioned(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update_if_version(&self, user: &User, expected_version: i32) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        // Same unique-email rule as the MySQL index
        if table
            .rows
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(DomainError::DuplicateEmail);
        }

        match table.rows.get_mut(&user.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = User {
                    id: stored.id,
                    created_at: stored.created_at,
                    version: expected_version + 1,
                    ..user.clone()
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.rows.values().any(|u| u.email == new_user.email) {
            return Err(DomainError::DuplicateEmail);
        }

        table.last_id += 1;
        let user = User {
            id: table.last_id,
            created_at: Utc::now(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            activated: false,
            version: 1,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.find_versioned(id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }
}
