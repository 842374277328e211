//! Request and response bodies

pub mod movie;
pub mod token;
pub mod user;

pub use movie::{MovieEnvelope, UpdateMovieRequest};
pub use token::{AuthenticationTokenEnvelope, CreateAuthenticationTokenRequest, EmailRequest, TokenView};
pub use user::{ActivateUserRequest, RegisterUserRequest, ResetPasswordRequest, UserEnvelope};

use serde::{Deserialize, Serialize};

/// `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
