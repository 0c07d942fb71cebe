//! Password hashing (argon2id)

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::AuthError;

/// A well-formed argon2id hash that matches no password. Verified against
/// when the account does not exist so that both login failure paths cost the
/// same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a stored hash
///
/// Returns `Ok(false)` on mismatch. A stored hash that cannot be parsed is an
/// error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

/// Verify login credentials when the account may not exist
///
/// `stored_hash` is `None` for an unknown username; the dummy hash is still
/// verified so the caller cannot be told apart by timing.
pub fn verify_credentials(password: &str, stored_hash: Option<&str>) -> Result<bool, AuthError> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            verify_password(password, DUMMY_HASH)?;
            Ok(false)
        }
    }
}
