//! Unit tests for the in-memory user repository

use crate::domain::entities::user::NewUser;
use crate::errors::DomainError;
use crate::repositories::user::{InMemoryUserRepository, UserRepository};
use crate::repositories::versioned::VersionedRepository;

#[tokio::test]
async fn test_insert_and_lookup() {
    let repo = InMemoryUserRepository::new();
    let user = repo
        .insert(&NewUser::new("Faith", "faith@example.com", "hash".to_string()))
        .await
        .unwrap();

    assert!(!user.activated);
    assert_eq!(user.version, 1);
    assert_eq!(repo.get(user.id).await.unwrap().unwrap().email, "faith@example.com");
    assert_eq!(
        repo.get_by_email("faith@example.com").await.unwrap().unwrap().id,
        user.id
    );
    assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.insert(&NewUser::new("Faith", "faith@example.com", "a".to_string()))
        .await
        .unwrap();

    let result = repo
        .insert(&NewUser::new("Other", "FAITH@example.com", "b".to_string()))
        .await;
    assert_eq!(result.unwrap_err(), DomainError::DuplicateEmail);
}

#[tokio::test]
async fn test_activation_is_versioned() {
    let repo = InMemoryUserRepository::new();
    let mut user = repo
        .insert(&NewUser::new("Faith", "faith@example.com", "hash".to_string()))
        .await
        .unwrap();

    user.activate();
    assert!(repo.update_if_version(&user, 1).await.unwrap());
    assert!(!repo.update_if_version(&user, 1).await.unwrap());

    let stored = repo.get(user.id).await.unwrap().unwrap();
    assert!(stored.activated);
    assert_eq!(stored.version, 2);
}
