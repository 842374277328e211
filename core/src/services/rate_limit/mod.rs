//! Per-client admission control

mod registry;


pub use registry::RateLimiterRegistry;
