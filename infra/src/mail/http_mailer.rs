//! HTTP mail API client
//!
//! Posts one JSON document per message to the configured endpoint:
//!
//! ```json
//! {"from": "...", "to": "...", "subject": "...", "text": "...", "template": "user_welcome"}
//! ```
//!
//! Transport failures and 5xx/429 responses are retried up to
//! `max_attempts` times with a fixed delay. Other 4xx responses fail at once.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use mq_core::errors::{DomainError, DomainResult};
use mq_core::services::{Mailer, OutboundMail};
use mq_shared::config::MailConfig;

use super::mask_email;
use crate::InfrastructureError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP mailer configuration
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    /// Mail API endpoint
    pub endpoint: String,
    /// Bearer credential, if the API needs one
    pub api_key: Option<String>,
    /// Sender address
    pub sender: String,
    /// Attempts per message, including the first
    pub max_attempts: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
    /// Timeout for each request
    pub request_timeout: Duration,
}

impl HttpMailerConfig {
    pub fn from_mail_config(config: &MailConfig) -> Result<Self, InfrastructureError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|endpoint| !endpoint.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("mail.endpoint is required for the http provider".to_string()))?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn with_retry_policy(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
    template: &'a str,
}

enum AttemptError {
    Retryable(String),
    Fatal(String),
}

/// Mailer backed by an HTTP mail API
pub struct HttpMailer {
    client: Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpMailerConfig {
        &self.config
    }

    async fn attempt(&self, payload: &MailPayload<'_>) -> Result<(), AttemptError> {
        let mut request = self.client.post(&self.config.endpoint).json(payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = format!("mail API responded with {}", status);
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(AttemptError::Retryable(message))
        } else {
            Err(AttemptError::Fatal(message))
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutboundMail) -> DomainResult<()> {
        let payload = MailPayload {
            from: &self.config.sender,
            to: &mail.recipient,
            subject: mail.template.subject(),
            text: mail.template.body(),
            template: mail.template.name(),
        };
        let recipient = mask_email(&mail.recipient);

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(
                "Sending mail attempt {}/{} to {}",
                attempts, self.config.max_attempts, recipient
            );

            match self.attempt(&payload).await {
                Ok(()) => {
                    info!(recipient = %recipient, template = payload.template, "Mail sent");
                    return Ok(());
                }
                Err(AttemptError::Fatal(message)) => {
                    error!(recipient = %recipient, "Mail rejected: {}", message);
                    return Err(DomainError::Internal { message });
                }
                Err(AttemptError::Retryable(message)) => {
                    if attempts >= self.config.max_attempts {
                        error!(
                            recipient = %recipient,
                            "Failed to send mail after {} attempts: {}", attempts, message
                        );
                        return Err(DomainError::Internal {
                            message: format!("mail delivery failed after {} attempts: {}", attempts, message),
                        });
                    }
                    warn!(
                        "Failed to send mail (attempt {}/{}): {}, retrying after {:?}",
                        attempts, self.config.max_attempts, message, self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }
}
