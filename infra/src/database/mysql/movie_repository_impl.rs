//! MySQL implementation of the MovieRepository trait.
//!
//! Genres are stored in a JSON column. Every write that changes a movie bumps
//! `version` in the same statement, so a single conditional `UPDATE` both
//! checks and claims the version.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{MySqlPool, Row};

use mq_core::domain::entities::movie::{Movie, MovieDraft};
use mq_core::errors::DomainError;
use mq_core::repositories::{MovieRepository, VersionedRepository};

use crate::database::storage_error;

const SELECT_MOVIE: &str = r#"
    SELECT id, created_at, title, year, runtime, genres, version
    FROM movies
    WHERE id = ?
"#;

/// MySQL implementation of MovieRepository
pub struct MySqlMovieRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlMovieRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_movie(row: &sqlx::mysql::MySqlRow) -> Result<Movie, DomainError> {
        let decode = |column: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", column, e),
        };

        let genres: Json<Vec<String>> = row.try_get("genres").map_err(|e| decode("genres", e))?;

        Ok(Movie {
            id: row.try_get("id").map_err(|e| decode("id", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| decode("created_at", e))?,
            title: row.try_get("title").map_err(|e| decode("title", e))?,
            year: row.try_get("year").map_err(|e| decode("year", e))?,
            runtime_minutes: row.try_get("runtime").map_err(|e| decode("runtime", e))?,
            genres: genres.0,
            version: row.try_get("version").map_err(|e| decode("version", e))?,
        })
    }
}

#[async_trait]
impl VersionedRepository<Movie> for MySqlMovieRepository {
    async fn find_versioned(&self, id: i64) -> Result<Option<Movie>, DomainError> {
        let row = sqlx::query(SELECT_MOVIE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find movie", e))?;

        row.as_ref().map(Self::row_to_movie).transpose()
    }

    async fn update_if_version(&self, movie: &Movie, expected_version: i32) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE movies
            SET title = ?, year = ?, runtime = ?, genres = ?, version = version + 1
            WHERE id = ? AND version = ?
        "#;

        let result = sqlx::query(query)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime_minutes)
            .bind(Json(&movie.genres))
            .bind(movie.id)
            .bind(expected_version)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to update movie", e))?;

        // `version = version + 1` always changes a matched row, so affected == matched
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete movie", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MovieRepository for MySqlMovieRepository {
    async fn insert(&self, draft: &MovieDraft) -> Result<Movie, DomainError> {
        let query = r#"
            INSERT INTO movies (title, year, runtime, genres, version)
            VALUES (?, ?, ?, ?, 1)
        "#;

        let result = sqlx::query(query)
            .bind(&draft.title)
            .bind(draft.year)
            .bind(draft.runtime_minutes)
            .bind(Json(&draft.genres))
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to insert movie", e))?;

        let id = result.last_insert_id() as i64;
        tracing::debug!(movie_id = id, "Movie inserted");

        self.get(id).await?.ok_or_else(|| DomainError::Internal {
            message: format!("Inserted movie {} could not be read back", id),
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Movie>, DomainError> {
        self.find_versioned(id).await
    }
}
