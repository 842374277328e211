//! Token bucket per client, kept in a sharded map
//!
//! Each bucket refills continuously (`rate` tokens per second up to `burst`)
//! and a request is admitted when one whole token can be taken. Different
//! clients live in different shards and proceed in parallel; the shard lock
//! is only held for the arithmetic below, never across an `.await`.

use dashmap::DashMap;
use mq_shared::config::RateLimitConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Bucket state for one client
#[derive(Debug)]
struct ClientBucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl ClientBucket {
    fn full(burst: f64, now: Instant) -> Self {
        Self {
            tokens: burst,
            last_refill: now,
            last_seen: now,
        }
    }

    fn try_take(&mut self, now: Instant, rate: f64, burst: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(burst);
        self.last_refill = now;
        self.last_seen = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct Limiter {
    buckets: DashMap<String, ClientBucket>,
    rate: f64,
    burst: f64,
    idle_timeout: Duration,
}

/// Registry of client buckets
///
/// Built disabled (no map at all) when the configuration turns limiting off.
pub struct RateLimiterRegistry {
    limiter: Option<Limiter>,
}

impl RateLimiterRegistry {
    pub fn new(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            info!("Rate limiting disabled");
            return Self::disabled();
        }

        Self {
            limiter: Some(Limiter {
                buckets: DashMap::new(),
                rate: config.requests_per_second,
                burst: f64::from(config.burst),
                idle_timeout: config.idle_timeout(),
            }),
        }
    }

    /// Registry that admits everything
    pub fn disabled() -> Self {
        Self { limiter: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Admit or reject one request from `client`
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    /// [`allow`](Self::allow) against an explicit clock reading
    pub fn allow_at(&self, client: &str, now: Instant) -> bool {
        let Some(limiter) = &self.limiter else {
            return true;
        };

        // Known clients avoid allocating a key
        if let Some(mut bucket) = limiter.buckets.get_mut(client) {
            return bucket.try_take(now, limiter.rate, limiter.burst);
        }

        let mut bucket = limiter.buckets.entry(client.to_owned()).or_insert_with(|| {
            debug!(client, "Creating rate limit bucket");
            ClientBucket::full(limiter.burst, now)
        });
        bucket.try_take(now, limiter.rate, limiter.burst)
    }

    /// Drop buckets not seen for longer than the idle timeout
    ///
    /// # Returns
    /// Number of buckets removed
    pub fn sweep_idle(&self, now: Instant) -> usize {
        let Some(limiter) = &self.limiter else {
            return 0;
        };

        let before = limiter.buckets.len();
        limiter
            .buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) <= limiter.idle_timeout);
        let removed = before.saturating_sub(limiter.buckets.len());

        if removed > 0 {
            debug!(removed, remaining = limiter.buckets.len(), "Swept idle rate limit buckets");
        }
        removed
    }

    /// Number of tracked clients
    pub fn bucket_count(&self) -> usize {
        self.limiter.as_ref().map_or(0, |l| l.buckets.len())
    }

    /// Run [`sweep_idle`](Self::sweep_idle) every `interval` on a tokio task
    ///
    /// Returns `None` when limiting is disabled. The caller aborts the handle
    /// on shutdown.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            return None;
        }

        // `tokio::time::interval` panics on a zero period
        let interval = if interval.is_zero() {
            warn!("Zero sweep interval, sweeping every second instead");
            MIN_SWEEP_INTERVAL
        } else {
            interval
        };

        let registry = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                registry.sweep_idle(Instant::now());
            }
        }))
    }
}
