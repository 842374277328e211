//! Token service module
//!
//! This module handles:
//! - Opaque token generation and SHA-256 digests
//! - Background cleanup of expired tokens

mod cleanup;
mod codec;


pub use cleanup::TokenCleanupService;
pub use codec::TokenCodec;
