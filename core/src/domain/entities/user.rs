//! User account entity and password hashing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::versioned::Versioned;
use crate::errors::{DomainError, DomainResult};

const MIN_PASSWORD_BYTES: usize = 8;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip_serializing)]
    pub version: i32,
}

impl User {
    /// Marks the account as activated
    pub fn activate(&mut self) {
        self.activated = true;
    }

    /// Replace the stored password hash
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
    }
}

impl Versioned for User {
    const RESOURCE: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

/// Data required to insert a new user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        Self {
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            password_hash,
        }
    }
}

/// bcrypt helpers for user passwords
pub struct Password;

impl Password {
    /// Check length limits before hashing
    pub fn validate(plaintext: &str) -> DomainResult<()> {
        if plaintext.len() < MIN_PASSWORD_BYTES {
            return Err(DomainError::validation("password must be at least 8 bytes long"));
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(DomainError::validation("password must not be more than 72 bytes long"));
        }
        Ok(())
    }

    pub fn hash(plaintext: &str, cost: u32) -> DomainResult<String> {
        Self::validate(plaintext)?;
        bcrypt::hash(plaintext, cost)
            .map_err(|e| DomainError::internal(format!("password hashing failed: {}", e)))
    }

    /// Returns false on mismatch; errors only for a malformed stored hash
    pub fn verify(plaintext: &str, hash: &str) -> DomainResult<bool> {
        bcrypt::verify(plaintext, hash)
            .map_err(|e| DomainError::internal(format!("password verification failed: {}", e)))
    }
}
