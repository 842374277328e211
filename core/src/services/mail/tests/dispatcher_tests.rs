//! Tests for mail templates and tracked dispatch

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::errors::{DomainError, DomainResult};
use crate::services::mail::{MailDispatcher, MailTemplate, Mailer, OutboundMail};
use crate::services::shutdown::ShutdownCoordinator;

/// Records delivered mail after a delay
#[derive(Default)]
struct SlowMailer {
    delivered: Mutex<Vec<OutboundMail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for SlowMailer {
    async fn send(&self, mail: &OutboundMail) -> DomainResult<()> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        if self.fail {
            return Err(DomainError::internal("provider rejected the message"));
        }
        self.delivered.lock().await.push(mail.clone());
        Ok(())
    }
}

fn welcome() -> OutboundMail {
    OutboundMail::new(
        "alice@example.com",
        MailTemplate::Welcome {
            user_id: 1,
            activation_token: "Y3VyaW91c2VyLXNlY3JldA".to_string(),
        },
    )
}

#[test]
fn test_template_body_carries_token_but_debug_does_not() {
    let mail = welcome();

    assert!(mail.template.body().contains("Y3VyaW91c2VyLXNlY3JldA"));
    assert!(!format!("{:?}", mail).contains("Y3VyaW91c2VyLXNlY3JldA"));
    assert_eq!(mail.template.name(), "user_welcome");
}

#[tokio::test(start_paused = true)]
async fn test_drain_waits_for_dispatched_mail() {
    let mailer = Arc::new(SlowMailer::default());
    let shutdown = ShutdownCoordinator::new();
    let dispatcher = MailDispatcher::new(mailer.clone(), shutdown.clone());

    dispatcher.dispatch(welcome()).unwrap();
    dispatcher.dispatch(welcome()).unwrap();
    assert_eq!(shutdown.outstanding(), 2);

    shutdown.drain(Duration::from_secs(30)).await.unwrap();
    assert_eq!(mailer.delivered.lock().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delivery_still_releases_unit() {
    let mailer = Arc::new(SlowMailer {
        fail: true,
        ..Default::default()
    });
    let shutdown = ShutdownCoordinator::new();
    let dispatcher = MailDispatcher::new(mailer.clone(), shutdown.clone());

    dispatcher.dispatch(welcome()).unwrap();
    shutdown.drain(Duration::from_secs(30)).await.unwrap();

    assert!(mailer.delivered.lock().await.is_empty());
    assert_eq!(shutdown.outstanding(), 0);
}

#[tokio::test]
async fn test_dispatch_rejected_while_draining() {
    let shutdown = ShutdownCoordinator::new();
    let dispatcher = MailDispatcher::new(Arc::new(SlowMailer::default()), shutdown.clone());
    shutdown.begin_drain();

    assert_eq!(
        dispatcher.dispatch(welcome()).unwrap_err(),
        DomainError::ShutdownInProgress
    );
}
