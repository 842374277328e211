//! Token cleanup service for periodic removal of expired tokens
//!
//! Expired tokens are already rejected on every lookup; this only keeps the
//! table from growing without bound.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Service for cleaning up expired tokens
pub struct TokenCleanupService {
    repository: Arc<dyn TokenRepository>,
    interval: Duration,
}

impl TokenCleanupService {
    /// Create a new token cleanup service
    pub fn new(repository: Arc<dyn TokenRepository>, interval: Duration) -> Self {
        Self {
            repository,
            interval,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of expired tokens deleted
    /// * `Err(DomainError)` - If the repository call fails
    pub async fn run_cleanup(&self) -> Result<u64, DomainError> {
        let deleted = self.repository.delete_expired().await?;
        if deleted > 0 {
            info!(deleted, "Deleted expired tokens");
        }
        Ok(deleted)
    }

    /// Start the cleanup service as a background task
    ///
    /// The returned handle is aborted by the binary on shutdown; a cleanup
    /// cycle holds no state worth draining.
    pub fn start_background_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "Token cleanup service started"
            );

            let mut interval_timer = tokio::time::interval(self.interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Token cleanup cycle failed");
                }
            }
        })
    }
}
