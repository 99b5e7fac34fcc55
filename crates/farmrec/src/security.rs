//! Password hashing.
//!
//! Passwords are stored as the hex SHA-256 digest of `password + salt`, with a
//! 32-character hex salt drawn from a random v4 UUID. This is the format of
//! the legacy `users.csv` dataset, so imported accounts keep working.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password with a freshly generated salt.
///
/// Returns `(password_hash, salt)`.
#[must_use]
pub fn hash_password(password: &str) -> (String, String) {
    let salt = generate_salt();
    let hash = hash_password_with_salt(password, &salt);
    (hash, salt)
}

/// Hash a password with a known salt.
#[must_use]
pub fn hash_password_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password against a stored hash and salt.
#[must_use]
pub fn verify_password(password: &str, password_hash: &str, salt: &str) -> bool {
    hash_password_with_salt(password, salt).eq_ignore_ascii_case(password_hash)
}

fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}
