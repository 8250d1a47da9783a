//! Session token generation.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// 32 bytes = 256 bits of entropy.
const TOKEN_BYTES: usize = 32;

/// Generate an opaque session token: CSPRNG bytes, base64 URL-safe encoded
/// without padding. Unpredictable to an observer and unique among live
/// sessions for any practical purpose (the store's primary key would reject
/// the astronomically unlikely collision).
pub fn generate_session_token() -> String {
    let mut buffer = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
