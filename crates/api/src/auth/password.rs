//! Argon2id password hashing and the password acceptance policy.
//!
//! Hashes are stored as PHC strings so the algorithm parameters and salt
//! travel with the hash. Plaintext never leaves this module except as the
//! caller's own input.

use akademik_core::error::CoreError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::AppError;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// Unparseable hashes (including the unusable-password marker) never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Reject passwords shorter than `min_length` characters.
///
/// `field` names the input the password arrived in (`password`, `password1`).
pub fn validate_password_strength(
    field: &str,
    password: &str,
    min_length: usize,
) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::invalid(
            field,
            format!("Ensure this field has at least {min_length} characters."),
        ));
    }
    Ok(())
}

/// Apply the acceptance policy and hash, mapping failures onto [`AppError`].
pub fn prepare_password(field: &str, password: &str, min_length: usize) -> Result<String, AppError> {
    validate_password_strength(field, password, min_length)?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}
