//! Schema for the MySQL backend
//!
//! Applied by integration tests against a scratch database. Production
//! schemas are managed outside the service.

use sqlx::MySqlPool;

use crate::InfrastructureError;

pub const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        name VARCHAR(500) NOT NULL,
        email VARCHAR(320) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        activated BOOLEAN NOT NULL DEFAULT FALSE,
        version INT NOT NULL DEFAULT 1,
        UNIQUE KEY users_email_unique (email)
    )
"#;

pub const CREATE_MOVIES: &str = r#"
    CREATE TABLE IF NOT EXISTS movies (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        title VARCHAR(500) NOT NULL,
        year INT NOT NULL,
        runtime INT NOT NULL,
        genres JSON NOT NULL,
        version INT NOT NULL DEFAULT 1,
        CONSTRAINT movies_runtime_check CHECK (runtime > 0),
        CONSTRAINT movies_year_check CHECK (year >= 1888)
    )
"#;

pub const CREATE_TOKENS: &str = r#"
    CREATE TABLE IF NOT EXISTS tokens (
        hash BINARY(32) NOT NULL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        expiry TIMESTAMP NOT NULL,
        scope VARCHAR(32) NOT NULL,
        KEY tokens_user_scope (user_id, scope),
        CONSTRAINT tokens_user_fk FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
    )
"#;

/// Statements in dependency order
pub const SCHEMA: [&str; 3] = [CREATE_USERS, CREATE_MOVIES, CREATE_TOKENS];

/// Create any missing table
pub async fn apply(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(tables = SCHEMA.len(), "Schema applied");
    Ok(())
}
