//! API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,

    /// Running environment name
    pub environment: String,

    /// Server version
    pub version: String,

    /// Lifecycle phase of the process (running, draining, stopped)
    pub phase: String,

    /// Server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Serving requests normally
    Available,
    /// Shutting down; new work is refused
    Draining,
}
