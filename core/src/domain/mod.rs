//! Domain layer containing business entities and the versioning contract.

pub mod entities;
pub mod versioned;

// Re-export commonly used domain types
pub use entities::*;
pub use versioned::Versioned;
