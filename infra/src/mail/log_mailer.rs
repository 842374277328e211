//! Mailer that only logs

use async_trait::async_trait;
use tracing::info;

use mq_core::errors::DomainResult;
use mq_core::services::{Mailer, OutboundMail};

use super::mask_email;

/// Logs recipient and template name; message bodies carry tokens and are never logged
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutboundMail) -> DomainResult<()> {
        info!(
            sender = %self.sender,
            recipient = %mask_email(&mail.recipient),
            template = mail.template.name(),
            subject = mail.template.subject(),
            "Mail delivered to log"
        );
        Ok(())
    }
}
