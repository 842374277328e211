//! Unit tests for database connection pool and error mapping

use mq_core::errors::DomainError;
use mq_shared::config::DatabaseConfig;

use crate::database::connection::{DatabasePool, PoolStatistics};
use crate::database::migrations::SCHEMA;
use crate::database::{is_unique_violation, storage_error};
use crate::InfrastructureError;

#[tokio::test]
async fn test_pool_creation_with_invalid_url() {
    let config = DatabaseConfig::new("invalid://url");

    let result = DatabasePool::new(&config).await;
    assert!(matches!(result, Err(InfrastructureError::Config(_))));
}

#[test]
fn test_pool_statistics_display() {
    let stats = PoolStatistics {
        connections: 5,
        idle_connections: 3,
        max_connections: 10,
    };
    assert_eq!(stats.to_string(), "5/10 connections (3 idle)");
}

#[test]
fn test_pool_errors_are_storage_unavailable() {
    let error = storage_error("load movie", sqlx::Error::PoolTimedOut);
    assert!(matches!(error, DomainError::StorageUnavailable { .. }));

    let error = storage_error("load movie", sqlx::Error::RowNotFound);
    assert!(matches!(error, DomainError::Internal { .. }));
    assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
}

#[test]
fn test_schema_order_creates_users_before_tokens() {
    let users = SCHEMA.iter().position(|s| s.contains("TABLE IF NOT EXISTS users"));
    let tokens = SCHEMA.iter().position(|s| s.contains("TABLE IF NOT EXISTS tokens"));
    assert!(users.unwrap() < tokens.unwrap());
}
