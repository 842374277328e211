//! In-memory MovieRepository used by tests and local runs without MySQL

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::movie::{Movie, MovieDraft};
use crate::errors::DomainError;
use crate::repositories::versioned::VersionedRepository;

use super::r#trait::MovieRepository;

#[derive(Default)]
struct Table {
    rows: HashMap<i64, Movie>,
    last_id: i64,
}

/// In-memory movie repository
///
/// The version check and the write happen under one write lock, which gives
/// the same guarantee as the conditional `UPDATE` in MySQL.
#[derive(Clone, Default)]
pub struct InMemoryMovieRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored movies
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VersionedRepository<Movie> for InMemoryMovieRepository {
    async fn find_versioned(&self, id: i64) -> Result<Option<Movie>, DomainError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update_if_version(&self, movie: &Movie, expected_version: i32) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&movie.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = Movie {
                    id: stored.id,
                    created_at: stored.created_at,
                    version: expected_version + 1,
                    ..movie.clone()
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
impl MovieRepository for InMemoryMovieRepository {
    async fn insert(&self, draft: &MovieDraft) -> Result<Movie, DomainError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let movie = Movie {
            id: table.last_id,
            created_at: Utc::now(),
            title: draft.title.clone(),
            year: draft.year,
            runtime_minutes: draft.runtime_minutes,
            genres: draft.genres.clone(),
            version: 1,
        };
        table.rows.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn get(&self, id: i64) -> Result<Option<Movie>, DomainError> {
        self.find_versioned(id).await
    }
}
