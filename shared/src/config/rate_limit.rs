//! Rate limiting configuration module

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Per-client token bucket configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting; when false every request is admitted
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sustained refill rate in tokens per second
    pub requests_per_second: f64,

    /// Bucket capacity (max requests in an instantaneous burst)
    pub burst: u32,

    /// Buckets idle for longer than this are evicted (seconds)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// How often the eviction sweep runs (seconds)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Reverse proxies allowed to name the client in `X-Forwarded-For` or
    /// `X-Real-IP`; requests from any other peer are keyed by peer address
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            requests_per_second: 2.0,
            burst: 4,
            idle_timeout_secs: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl RateLimitConfig {
    /// Create a configuration with explicit rate and burst
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst,
            ..Default::default()
        }
    }

    /// Configuration with limiting switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Trust forwarded headers from these proxy addresses
    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = proxies.into_iter().collect();
        self
    }

    /// Reject settings the limiter cannot run with
    ///
    /// A non-positive rate would drain buckets instead of refilling them and a
    /// zero sweep interval would stop eviction.
    pub fn validate(&self) -> Result<(), String> {
        if !self.requests_per_second.is_finite() || self.requests_per_second <= 0.0 {
            return Err(format!(
                "rate_limit.requests_per_second must be a positive number, got {}",
                self.requests_per_second
            ));
        }
        if self.burst < 1 {
            return Err("rate_limit.burst must be at least 1".to_string());
        }
        if self.sweep_interval_secs < 1 {
            return Err("rate_limit.sweep_interval_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Idle threshold as a `Duration`
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Sweep interval as a `Duration`
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            requests_per_second: 10.0,
            burst: 20,
            ..Default::default()
        }
    }

    /// Create a production configuration (stricter limits)
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_idle_timeout() -> u64 {
    180 // 3 minutes
}

fn default_sweep_interval() -> u64 {
    60
}
