//! Token lifetime and password hashing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Lifetime of authentication (bearer) tokens in seconds
    #[serde(default = "default_authentication_ttl")]
    pub authentication_ttl: u64,

    /// Lifetime of account activation tokens in seconds
    #[serde(default = "default_activation_ttl")]
    pub activation_ttl: u64,

    /// Lifetime of password reset tokens in seconds
    #[serde(default = "default_password_reset_ttl")]
    pub password_reset_ttl: u64,

    /// bcrypt work factor for stored password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authentication_ttl: default_authentication_ttl(),
            activation_ttl: default_activation_ttl(),
            password_reset_ttl: default_password_reset_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl AuthConfig {
    pub fn authentication_ttl(&self) -> Duration {
        Duration::from_secs(self.authentication_ttl)
    }

    pub fn activation_ttl(&self) -> Duration {
        Duration::from_secs(self.activation_ttl)
    }

    pub fn password_reset_ttl(&self) -> Duration {
        Duration::from_secs(self.password_reset_ttl)
    }
}

fn default_authentication_ttl() -> u64 {
    24 * 60 * 60 // 24 hours
}

fn default_activation_ttl() -> u64 {
    3 * 24 * 60 * 60 // 3 days
}

fn default_password_reset_ttl() -> u64 {
    45 * 60 // 45 minutes
}

fn default_bcrypt_cost() -> u32 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert_eq!(config.authentication_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.activation_ttl(), Duration::from_secs(259_200));
        assert_eq!(config.password_reset_ttl(), Duration::from_secs(2_700));
        assert_eq!(config.bcrypt_cost, 12);
    }
}
