//! Type definitions shared by the API layer
//!
//! - `response` - health check payloads

pub mod response;

pub use response::{HealthResponse, HealthStatus};
