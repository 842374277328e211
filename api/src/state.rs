//! Application state shared by every worker

use std::net::IpAddr;
use std::sync::Arc;

use mq_core::domain::{Movie, User};
use mq_core::repositories::{
    InMemoryMovieRepository, InMemoryTokenRepository, InMemoryUserRepository, MovieRepository, TokenRepository,
    UserRepository,
};
use mq_core::services::{
    Authenticator, MailDispatcher, Mailer, RateLimiterRegistry, ShutdownCoordinator, VersionedStore,
};
use mq_shared::config::{AppConfig, AuthConfig, Environment};

/// Repository trait objects backing the API
#[derive(Clone)]
pub struct Repositories {
    pub movies: Arc<dyn MovieRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

impl Repositories {
    /// Process-local storage, used by tests and by local runs without MySQL
    pub fn in_memory() -> Self {
        Self {
            movies: Arc::new(InMemoryMovieRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryTokenRepository::new()),
        }
    }
}

/// Everything a handler can reach
///
/// All process-wide mutable structures (bucket map, outstanding-task count)
/// are owned here; nothing is global.
pub struct AppState {
    pub environment: Environment,
    pub auth: AuthConfig,
    pub repositories: Repositories,
    pub movies: VersionedStore<Movie, dyn MovieRepository>,
    pub users: VersionedStore<User, dyn UserRepository>,
    pub authenticator: Arc<Authenticator>,
    pub rate_limiter: Arc<RateLimiterRegistry>,
    /// Peers whose forwarded headers name the client
    pub trusted_proxies: Arc<[IpAddr]>,
    pub shutdown: ShutdownCoordinator,
    pub mail: MailDispatcher,
    /// JSON body limit in bytes
    pub max_payload_size: usize,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        repositories: Repositories,
        mailer: Arc<dyn Mailer>,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        let authenticator = Authenticator::new(Arc::clone(&repositories.tokens), Arc::clone(&repositories.users));

        Self {
            environment: config.environment,
            auth: config.auth.clone(),
            movies: VersionedStore::new(Arc::clone(&repositories.movies)),
            users: VersionedStore::new(Arc::clone(&repositories.users)),
            repositories,
            authenticator: Arc::new(authenticator),
            rate_limiter: Arc::new(RateLimiterRegistry::new(&config.rate_limit)),
            trusted_proxies: config.rate_limit.trusted_proxies.clone().into(),
            mail: MailDispatcher::new(mailer, shutdown.clone()),
            shutdown,
            max_payload_size: config.server.max_payload_size,
        }
    }
}
