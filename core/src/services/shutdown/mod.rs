//! Background task tracking and graceful drain
//!
//! The coordinator moves through `Running → Draining → Stopped`. Work is
//! registered while running and the process waits for it before exiting.

mod coordinator;


pub use coordinator::{ShutdownCoordinator, ShutdownPhase, TaskGuard};
