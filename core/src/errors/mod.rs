//! Domain error types shared by every core service.
//!
//! Components never retry internally; callers decide using
//! [`DomainError::is_retryable`].

use thiserror::Error;

/// Credential and account-state failures
///
/// The first three variants are reported to clients with one generic body so
/// that a caller cannot tell which check rejected the token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid or missing authentication token")]
    InvalidCredentials,

    #[error("authentication token has expired")]
    Expired,

    #[error("authentication token scope does not match")]
    ScopeMismatch,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    InactiveAccount,

    #[error("invalid email or password")]
    InvalidPassword,
}

impl AuthError {
    /// True for failures that come from the presented token itself
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::Expired | AuthError::ScopeMismatch
        )
    }
}

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error("the requested {resource} could not be found")]
    NotFound { resource: String },

    #[error("invalid id: {id}")]
    InvalidId { id: i64 },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("a user with this email address already exists")]
    DuplicateEmail,

    #[error("server is shutting down")]
    ShutdownInProgress,

    #[error("shutdown timed out with {outstanding} background task(s) still running")]
    ShutdownTimeout { outstanding: usize },

    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Only an edit conflict is worth retrying: the caller re-reads and
    /// re-applies its change against the new version.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::EditConflict)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
