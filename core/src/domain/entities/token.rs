//! Stateful bearer token entities.
//!
//! Only the SHA-256 digest of a token is ever stored. The plaintext exists
//! once, inside the [`IssuedToken`] handed back by issuance, and is redacted
//! from every `Debug` rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Random bytes drawn for every token
pub const TOKEN_BYTES: usize = 16;

/// Length of the URL-safe base64 (unpadded) plaintext
pub const TOKEN_LENGTH: usize = 22;

/// SHA-256 digest of a token plaintext
pub type TokenHash = [u8; 32];

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenScope {
    /// Bearer credential for API requests
    Authentication,
    /// Single-use account activation
    Activation,
    /// Single-use password reset
    PasswordReset,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Authentication => "authentication",
            TokenScope::Activation => "activation",
            TokenScope::PasswordReset => "password-reset",
        }
    }

    /// Single-use tokens are deleted when consumed
    pub fn is_single_use(&self) -> bool {
        !matches!(self, TokenScope::Authentication)
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authentication" => Ok(TokenScope::Authentication),
            "activation" => Ok(TokenScope::Activation),
            "password-reset" => Ok(TokenScope::PasswordReset),
            other => Err(format!("unknown token scope: {}", other)),
        }
    }
}

/// Persisted form of a token
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub hash: TokenHash,
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
}

impl AuthToken {
    pub fn new(hash: TokenHash, user_id: i64, expiry: DateTime<Utc>, scope: TokenScope) -> Self {
        Self {
            hash,
            user_id,
            expiry,
            scope,
        }
    }

    /// A token is expired once `now` reaches its expiry
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("hash", &format!("{}…", hex::encode(&self.hash[..4])))
            .field("user_id", &self.user_id)
            .field("expiry", &self.expiry)
            .field("scope", &self.scope)
            .finish()
    }
}

/// A freshly issued token, the only value that ever holds the plaintext
#[derive(Clone)]
pub struct IssuedToken {
    plaintext: String,
    pub token: AuthToken,
}

impl IssuedToken {
    pub fn new(plaintext: String, token: AuthToken) -> Self {
        Self { plaintext, token }
    }

    /// The plaintext to hand to the client (response body or mail)
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.token.expiry
    }

    pub fn into_plaintext(self) -> String {
        self.plaintext
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plaintext", &"[REDACTED]")
            .field("token", &self.token)
            .finish()
    }
}
