//! Fire-and-forget mail as tracked background work

use std::sync::Arc;
use tracing::{debug, error};

use crate::errors::DomainResult;
use crate::services::shutdown::ShutdownCoordinator;

use super::mailer::{Mailer, OutboundMail};

/// Sends mail on a tracked task so shutdown waits for it
#[derive(Clone)]
pub struct MailDispatcher {
    mailer: Arc<dyn Mailer>,
    shutdown: ShutdownCoordinator,
}

impl MailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, shutdown: ShutdownCoordinator) -> Self {
        Self { mailer, shutdown }
    }

    /// Queue `mail` for delivery
    ///
    /// Delivery failures are logged, never returned: the request that caused
    /// the mail has already succeeded.
    ///
    /// # Errors
    /// `ShutdownInProgress` when the process is draining; nothing is sent
    pub fn dispatch(&self, mail: OutboundMail) -> DomainResult<()> {
        let mailer = Arc::clone(&self.mailer);

        self.shutdown.track("send_mail", async move {
            let template = mail.template.name();
            match mailer.send(&mail).await {
                Ok(()) => debug!(template, "Mail delivered"),
                Err(e) => error!(template, error = %e, "Mail delivery failed"),
            }
        })
    }
}
