//! Password hashing and verification.
//!
//! scrypt via the PHC `password_hash` API: per-password random salt, cost
//! parameters fixed at hash creation time and carried inside the encoded
//! string. Verification re-derives with those parameters and compares in
//! constant time.

use scrypt::{
    Scrypt,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::HubError;

pub fn hash_password(plain: &str) -> Result<String, HubError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}
