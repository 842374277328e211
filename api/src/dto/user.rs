use serde::{Deserialize, Serialize};
use validator::Validate;

use mq_core::domain::User;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 bytes long"))]
    pub name: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    /// Checked against the password rules in `Password::validate`
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivateUserRequest {
    #[validate(length(min = 1, message = "must be provided"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub password: String,

    #[validate(length(min = 1, message = "must be provided"))]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}
