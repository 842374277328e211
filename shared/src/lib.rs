//! Shared utilities and common types for the Marquee server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types and layered loading
//! - The wire error body returned by every endpoint
//! - Common response types

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig,
    MailConfig, MailProvider, RateLimitConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{HealthResponse, HealthStatus};
