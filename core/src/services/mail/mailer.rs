//! Mail collaborator trait and message templates

use async_trait::async_trait;
use std::fmt;

use crate::errors::DomainResult;

/// Message content; tokens are only rendered into the body
#[derive(Clone, PartialEq, Eq)]
pub enum MailTemplate {
    /// Sent after registration, carries the first activation token
    Welcome { user_id: i64, activation_token: String },
    /// Re-issued activation token
    ActivationToken { activation_token: String },
    /// Password reset token
    PasswordReset { reset_token: String },
}

impl MailTemplate {
    /// Stable template name used in logs and by HTTP providers
    pub fn name(&self) -> &'static str {
        match self {
            MailTemplate::Welcome { .. } => "user_welcome",
            MailTemplate::ActivationToken { .. } => "token_activation",
            MailTemplate::PasswordReset { .. } => "token_password_reset",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            MailTemplate::Welcome { .. } => "Welcome to Marquee!",
            MailTemplate::ActivationToken { .. } => "Activate your Marquee account",
            MailTemplate::PasswordReset { .. } => "Reset your Marquee password",
        }
    }

    /// Plain-text body
    pub fn body(&self) -> String {
        match self {
            MailTemplate::Welcome {
                user_id,
                activation_token,
            } => format!(
                "Hi,\n\nThanks for signing up for a Marquee account. Your user ID number is {}.\n\n\
                 Please send a request to `PUT /v1/users/activated` with the following JSON body \
                 to activate your account:\n\n{{\"token\": \"{}\"}}\n\n\
                 Please note that this is a one-time use token and it will expire in 3 days.\n",
                user_id, activation_token
            ),
            MailTemplate::ActivationToken { activation_token } => format!(
                "Hi,\n\nPlease send a `PUT /v1/users/activated` request with the following JSON body \
                 to activate your account:\n\n{{\"token\": \"{}\"}}\n\n\
                 Please note that this is a one-time use token and it will expire in 3 days.\n",
                activation_token
            ),
            MailTemplate::PasswordReset { reset_token } => format!(
                "Hi,\n\nPlease send a `PUT /v1/users/password` request with the following JSON body \
                 to set a new password:\n\n{{\"password\": \"your new password\", \"token\": \"{}\"}}\n\n\
                 Please note that this is a one-time use token and it will expire in 45 minutes.\n",
                reset_token
            ),
        }
    }
}

impl fmt::Debug for MailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailTemplate")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// One message to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub recipient: String,
    pub template: MailTemplate,
}

impl OutboundMail {
    pub fn new(recipient: impl Into<String>, template: MailTemplate) -> Self {
        Self {
            recipient: recipient.into(),
            template,
        }
    }
}

/// Mail delivery backend
///
/// Implementations own their retry policy; callers never retry.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> DomainResult<()>;
}
