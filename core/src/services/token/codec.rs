//! Opaque bearer token generation and hashing

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::entities::token::{TokenHash, TOKEN_BYTES, TOKEN_LENGTH};

/// Stateless token codec
///
/// Tokens are 16 bytes from the thread-local CSPRNG (seeded from the OS),
/// encoded as unpadded URL-safe base64. Storage only ever sees the digest.
pub struct TokenCodec;

impl TokenCodec {
    /// Generate a new random plaintext token
    pub fn generate() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// SHA-256 digest of a plaintext token
    pub fn digest(plaintext: &str) -> TokenHash {
        Sha256::digest(plaintext.as_bytes()).into()
    }

    /// Cheap shape check done before any storage lookup
    pub fn is_well_formed(plaintext: &str) -> bool {
        plaintext.len() == TOKEN_LENGTH
            && plaintext
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    /// Short digest prefix, safe to put in logs
    pub fn fingerprint(hash: &TokenHash) -> String {
        hex::encode(&hash[..4])
    }
}
