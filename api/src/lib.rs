//! # Marquee HTTP API
//!
//! actix-web surface over the core services: admission control, bearer
//! authentication, versioned movie and user updates, and a graceful drain of
//! background work on shutdown.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use app::create_app;
pub use state::{AppState, Repositories};
