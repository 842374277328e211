//! Mail delivery backends
//!
//! [`LogMailer`] writes a log line per message and is used in development.
//! [`HttpMailer`] posts messages to a transactional mail API with a bounded
//! retry policy.

pub mod http_mailer;
pub mod log_mailer;


use std::sync::Arc;

use mq_core::services::Mailer;
use mq_shared::config::{MailConfig, MailProvider};

use crate::InfrastructureError;

pub use http_mailer::{HttpMailer, HttpMailerConfig};
pub use log_mailer::LogMailer;

/// Build the configured mail backend
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, InfrastructureError> {
    match config.provider {
        MailProvider::Log => {
            tracing::info!("Mail delivery: log only");
            Ok(Arc::new(LogMailer::new(config.sender.clone())))
        }
        MailProvider::Http => {
            let config = HttpMailerConfig::from_mail_config(config)?;
            tracing::info!(endpoint = %config.endpoint, "Mail delivery: HTTP API");
            Ok(Arc::new(HttpMailer::new(config)?))
        }
    }
}

/// Mask the local part of an address for logs
///
/// `alice@example.com` becomes `a****@example.com`.
pub fn mask_email(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match chars.next() {
                Some(first) => format!("{}{}@{}", first, "*".repeat(chars.count()), domain),
                None => format!("@{}", domain),
            }
        }
        None => "*".repeat(address.chars().count()),
    }
}
