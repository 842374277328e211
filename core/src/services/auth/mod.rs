//! Authentication service module
//!
//! Stateful bearer tokens: every request's token is digested and looked up,
//! nothing the client sends about its own identity is trusted.

mod authenticator;

#[cfg(test)]
mod tests;

pub use authenticator::Authenticator;
