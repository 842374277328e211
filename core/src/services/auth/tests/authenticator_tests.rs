//! Tests for bearer token authentication

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::token::{AuthToken, TokenScope};
use crate::domain::entities::user::{NewUser, User};
use crate::errors::{AuthError, DomainError};
use crate::repositories::{InMemoryTokenRepository, InMemoryUserRepository, TokenRepository, UserRepository};
use crate::services::auth::Authenticator;
use crate::services::token::TokenCodec;

struct Fixture {
    authenticator: Arc<Authenticator>,
    tokens: Arc<InMemoryTokenRepository>,
    user: User,
}

async fn fixture() -> Fixture {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users
        .insert(&NewUser::new("Alice", "alice@example.com", "hash".to_string()))
        .await
        .unwrap();

    Fixture {
        authenticator: Arc::new(Authenticator::new(tokens.clone(), users)),
        tokens,
        user,
    }
}

fn auth_error(result: Result<User, DomainError>) -> AuthError {
    match result {
        Err(DomainError::Auth(e)) => e,
        other => panic!("expected auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_issue_then_authenticate() {
    let f = fixture().await;

    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Authentication, Duration::from_secs(3600))
        .await
        .unwrap();

    // Only the digest is stored
    let stored = f.tokens.find_by_hash(&issued.token.hash).await.unwrap().unwrap();
    assert_eq!(stored.hash, TokenCodec::digest(issued.plaintext()));
    assert!(stored.expiry > Utc::now());

    let user = f
        .authenticator
        .authenticate(issued.plaintext(), TokenScope::Authentication)
        .await
        .unwrap();
    assert_eq!(user.id, f.user.id);
}

#[tokio::test]
async fn test_unknown_and_malformed_tokens() {
    let f = fixture().await;

    let unknown = TokenCodec::generate();
    assert_eq!(
        auth_error(f.authenticator.authenticate(&unknown, TokenScope::Authentication).await),
        AuthError::InvalidCredentials
    );
    assert_eq!(
        auth_error(f.authenticator.authenticate("not a token", TokenScope::Authentication).await),
        AuthError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_expired_token_fails() {
    let f = fixture().await;
    let plaintext = TokenCodec::generate();
    let token = AuthToken::new(
        TokenCodec::digest(&plaintext),
        f.user.id,
        Utc::now() - ChronoDuration::seconds(1),
        TokenScope::Authentication,
    );
    f.tokens.insert(&token).await.unwrap();

    assert_eq!(
        auth_error(f.authenticator.authenticate(&plaintext, TokenScope::Authentication).await),
        AuthError::Expired
    );
}

#[tokio::test]
async fn test_zero_ttl_token_is_already_expired() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Authentication, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(
        auth_error(
            f.authenticator
                .authenticate(issued.plaintext(), TokenScope::Authentication)
                .await
        ),
        AuthError::Expired
    );
}

#[tokio::test]
async fn test_scope_mismatch() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Activation, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        auth_error(
            f.authenticator
                .authenticate(issued.plaintext(), TokenScope::Authentication)
                .await
        ),
        AuthError::ScopeMismatch
    );
}

#[tokio::test]
async fn test_single_use_token_cannot_be_consumed_twice() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Activation, Duration::from_secs(60))
        .await
        .unwrap();

    let user = f
        .authenticator
        .consume(issued.plaintext(), TokenScope::Activation)
        .await
        .unwrap();
    assert_eq!(user.id, f.user.id);

    assert_eq!(
        auth_error(f.authenticator.consume(issued.plaintext(), TokenScope::Activation).await),
        AuthError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_concurrent_consumers_have_one_winner() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::PasswordReset, Duration::from_secs(60))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let authenticator = f.authenticator.clone();
            let plaintext = issued.plaintext().to_string();
            tokio::spawn(async move {
                authenticator
                    .consume(&plaintext, TokenScope::PasswordReset)
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e, DomainError::Auth(AuthError::InvalidCredentials)),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_revoke_all_only_touches_one_scope() {
    let f = fixture().await;
    let ttl = Duration::from_secs(60);
    let a = f.authenticator.issue(f.user.id, TokenScope::Authentication, ttl).await.unwrap();
    let b = f.authenticator.issue(f.user.id, TokenScope::Authentication, ttl).await.unwrap();
    let activation = f.authenticator.issue(f.user.id, TokenScope::Activation, ttl).await.unwrap();

    let revoked = f
        .authenticator
        .revoke_all(f.user.id, TokenScope::Authentication)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    for token in [&a, &b] {
        assert!(f
            .authenticator
            .authenticate(token.plaintext(), TokenScope::Authentication)
            .await
            .is_err());
    }
    assert!(f
        .authenticator
        .authenticate(activation.plaintext(), TokenScope::Activation)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_token_of_deleted_user_is_invalid() {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let authenticator = Authenticator::new(tokens.clone(), users);

    // Owner 99 never existed
    let issued = authenticator
        .issue(99, TokenScope::Authentication, Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        auth_error(
            authenticator
                .authenticate(issued.plaintext(), TokenScope::Authentication)
                .await
        ),
        AuthError::InvalidCredentials
    );
}

#[tokio::test]
async fn test_failed_redemption_keeps_the_token() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Activation, Duration::from_secs(60))
        .await
        .unwrap();

    let failed: Result<(), DomainError> = f
        .authenticator
        .redeem(issued.plaintext(), TokenScope::Activation, |_| async {
            Err(DomainError::EditConflict)
        })
        .await;
    assert_eq!(failed, Err(DomainError::EditConflict));

    let hash = TokenCodec::digest(issued.plaintext());
    assert!(f.tokens.find_by_hash(&hash).await.unwrap().is_some());

    let owner_id = f
        .authenticator
        .redeem(issued.plaintext(), TokenScope::Activation, |owner| async move {
            Ok::<_, DomainError>(owner.id)
        })
        .await
        .unwrap();
    assert_eq!(owner_id, f.user.id);
    assert!(f.tokens.find_by_hash(&hash).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redeem_checks_the_token_before_applying() {
    let f = fixture().await;
    let issued = f
        .authenticator
        .issue(f.user.id, TokenScope::Authentication, Duration::from_secs(60))
        .await
        .unwrap();

    let mut applied = false;
    let result = f
        .authenticator
        .redeem(issued.plaintext(), TokenScope::PasswordReset, |_| {
            applied = true;
            async { Ok::<_, DomainError>(()) }
        })
        .await;

    assert_eq!(result, Err(DomainError::Auth(AuthError::ScopeMismatch)));
    assert!(!applied);
}
