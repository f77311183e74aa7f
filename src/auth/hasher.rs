//! One-way salted hashing and verification of passwords.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};

/// Hash a raw password into a PHC string with a fresh random salt.
///
/// Repeated calls on the same input yield different strings; all of them
/// verify against the original password.
///
/// # Errors
/// Returns an error if the salt cannot be generated or hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;

    Ok(hash.to_string())
}

/// Verify a raw password against a stored PHC string.
///
/// Fails closed: a malformed stored hash verifies as `false` rather than
/// raising.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
