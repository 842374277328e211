//! Outbound mail configuration

use serde::{Deserialize, Serialize};

/// Which mail backend delivers messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write a log line instead of sending (development)
    Log,
    /// POST to an HTTP mail API
    Http,
}

/// Mail delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(default = "default_provider")]
    pub provider: MailProvider,

    /// HTTP endpoint of the mail API (required for `http`)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key sent as a bearer credential to the mail API
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            sender: default_sender(),
            timeout_secs: default_timeout(),
        }
    }
}

impl MailConfig {
    /// HTTP provider with no endpoint yet; expected to be filled from the environment
    pub fn http_default() -> Self {
        Self {
            provider: MailProvider::Http,
            ..Default::default()
        }
    }
}

fn default_provider() -> MailProvider {
    MailProvider::Log
}

fn default_sender() -> String {
    String::from("Marquee <no-reply@marquee.local>")
}

fn default_timeout() -> u64 {
    10
}
