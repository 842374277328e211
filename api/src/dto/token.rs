use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use mq_core::domain::IssuedToken;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthenticationTokenRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "must be provided"))]
    pub password: String,
}

/// Body of the activation and password-reset token requests
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// Plaintext token as handed to its owner, exactly once
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenView {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl std::fmt::Debug for TokenView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenView")
            .field("token", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl From<IssuedToken> for TokenView {
    fn from(issued: IssuedToken) -> Self {
        let expiry = issued.expiry();
        Self {
            token: issued.into_plaintext(),
            expiry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationTokenEnvelope {
    pub authentication_token: TokenView,
}
