//! Authentication utility functions.

use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;

/// Length of generated passwords for bootstrap accounts.
pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Generate a secure random API key for a new session
pub fn generate_api_key() -> String {
    // Generate 32 bytes (256 bits) of cryptographically secure random data
    let mut key_bytes = [0u8; 32];
    rng().fill(&mut key_bytes);

    // Encode as base64url without padding
    general_purpose::URL_SAFE_NO_PAD.encode(key_bytes)
}

/// Generate a random alphanumeric password
pub fn generate_password(len: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rng();
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
