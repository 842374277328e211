//! # Marquee Core
//!
//! Domain layer and concurrency-safety services for the Marquee backend:
//! per-client rate limiting, stateful bearer tokens, optimistic concurrency
//! for versioned entities and graceful shutdown of background work.
//!
//! Nothing in here is a global singleton. The binary constructs each service
//! once and shares it through application state; tests build fresh ones.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    AuthToken, IssuedToken, Movie, MovieDraft, MoviePatch, NewUser, Password, TokenScope, User,
    Versioned,
};
pub use errors::{AuthError, DomainError, DomainResult};
pub use repositories::{
    InMemoryMovieRepository, InMemoryTokenRepository, InMemoryUserRepository, MovieRepository,
    TokenRepository, UserRepository, VersionedRepository,
};
pub use services::{
    Authenticator, MailDispatcher, MailTemplate, Mailer, OutboundMail, RateLimiterRegistry,
    ShutdownCoordinator, ShutdownPhase, TaskGuard, TokenCleanupService, TokenCodec,
    VersionedStore,
};
