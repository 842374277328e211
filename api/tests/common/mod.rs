//! Shared fixtures for the API integration tests
#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mq_api::{AppState, Repositories};
use mq_core::domain::{NewUser, Password, TokenScope, User};
use mq_core::errors::{DomainError, DomainResult};
use mq_core::repositories::{InMemoryUserRepository, UserRepository, VersionedRepository};
use mq_core::services::{MailTemplate, Mailer, OutboundMail, ShutdownCoordinator};
use mq_shared::config::{AppConfig, RateLimitConfig};

pub const PASSWORD: &str = "pa55word-for-tests";

/// Mailer that keeps every message for inspection
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait for the tracked send task to run
    pub async fn wait_for(&self, count: usize) -> Vec<OutboundMail> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} mails, got {}", count, self.sent().len());
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutboundMail) -> DomainResult<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// User storage where, once armed, another writer bumps the stored version
/// just before the next conditional write
#[derive(Default)]
pub struct RacingUsers {
    inner: InMemoryUserRepository,
    armed: AtomicBool,
}

impl RacingUsers {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VersionedRepository<User> for RacingUsers {
    async fn find_versioned(&self, id: i64) -> DomainResult<Option<User>> {
        self.inner.find_versioned(id).await
    }

    async fn update_if_version(&self, user: &User, expected_version: i32) -> DomainResult<bool> {
        if self.armed.swap(false, Ordering::SeqCst) {
            if let Some(current) = self.inner.find_versioned(user.id).await? {
                self.inner.update_if_version(&current, current.version).await?;
            }
        }
        self.inner.update_if_version(user, expected_version).await
    }

    async fn delete(&self, id: i64) -> DomainResult<bool> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl UserRepository for RacingUsers {
    async fn insert(&self, new_user: &NewUser) -> Result<User, DomainError> {
        self.inner.insert(new_user).await
    }

    async fn get(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.inner.get(id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.inner.get_by_email(email).await
    }
}

/// Context whose user storage races the next account update
pub fn racing_context() -> (TestContext, Arc<RacingUsers>) {
    let users = Arc::new(RacingUsers::default());
    let mut repositories = Repositories::in_memory();
    repositories.users = users.clone();
    (context_over(test_config(), repositories), users)
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.bcrypt_cost = 4;
    config.rate_limit = RateLimitConfig::disabled();
    config
}

pub fn context() -> TestContext {
    context_with(test_config())
}

pub fn context_with(config: AppConfig) -> TestContext {
    context_over(config, Repositories::in_memory())
}

pub fn context_over(config: AppConfig, repositories: Repositories) -> TestContext {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        &config,
        repositories,
        mailer.clone(),
        ShutdownCoordinator::new(),
    );
    TestContext {
        state: web::Data::new(state),
        mailer,
    }
}

impl TestContext {
    pub async fn seed_user(&self, email: &str, activated: bool) -> User {
        let hash = Password::hash(PASSWORD, 4).unwrap();
        let user = self
            .state
            .repositories
            .users
            .insert(&NewUser::new("Test User", email, hash))
            .await
            .unwrap();

        if !activated {
            return user;
        }
        self.state
            .users
            .update_entity(user.id, user.version, |user| {
                user.activate();
                Ok(())
            })
            .await
            .unwrap()
    }

    pub async fn token_for(&self, user: &User, scope: TokenScope) -> String {
        self.state
            .authenticator
            .issue(user.id, scope, Duration::from_secs(3600))
            .await
            .unwrap()
            .into_plaintext()
    }

    /// Activated user plus a bearer header value
    pub async fn signed_in(&self, email: &str) -> (User, String) {
        let user = self.seed_user(email, true).await;
        let token = self.token_for(&user, TokenScope::Authentication).await;
        (user, format!("Bearer {}", token))
    }
}

pub fn token_in(mail: &OutboundMail) -> String {
    match &mail.template {
        MailTemplate::Welcome { activation_token, .. } => activation_token.clone(),
        MailTemplate::ActivationToken { activation_token } => activation_token.clone(),
        MailTemplate::PasswordReset { reset_token } => reset_token.clone(),
    }
}
