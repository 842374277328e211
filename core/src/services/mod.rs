//! Concurrency-safety services and their collaborators.
//!
//! - `rate_limit` - per-client token buckets
//! - `token` - token generation, digests and expired-token cleanup
//! - `auth` - bearer token validation, issuance and single-use consumption
//! - `versioning` - optimistic concurrency for versioned entities
//! - `shutdown` - background task tracking and graceful drain
//! - `mail` - outbound mail dispatched as tracked background work

pub mod auth;
pub mod mail;
pub mod rate_limit;
pub mod shutdown;
pub mod token;
pub mod versioning;

// Re-export commonly used types
pub use auth::Authenticator;
pub use mail::{MailDispatcher, MailTemplate, Mailer, OutboundMail};
pub use rate_limit::RateLimiterRegistry;
pub use shutdown::{ShutdownCoordinator, ShutdownPhase, TaskGuard};
pub use token::{TokenCleanupService, TokenCodec};
pub use versioning::VersionedStore;
