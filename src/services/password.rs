//! Password hashing: PBKDF2-HMAC-SHA256, stored as base64(salt || key)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SALT_SIZE: usize = 16;
pub const HASH_SIZE: usize = 20;
pub const ITERATIONS: u32 = 10_000;

/// Stored value checked when the login name is unknown, so that both
/// failure paths cost one key derivation.
pub(crate) const DUMMY_HASH: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn derive_key(password: &str, salt: &[u8]) -> [u8; HASH_SIZE] {
    let mut key = [0u8; HASH_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
    key
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(password, &salt);

    let mut stored = [0u8; SALT_SIZE + HASH_SIZE];
    stored[..SALT_SIZE].copy_from_slice(&salt);
    stored[SALT_SIZE..].copy_from_slice(&key);

    STANDARD.encode(stored)
}

/// Check a password against a stored hash.
///
/// Malformed stored values (bad base64, wrong length) never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let bytes = match STANDARD.decode(stored) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if bytes.len() != SALT_SIZE + HASH_SIZE {
        return false;
    }

    let (salt, expected) = bytes.split_at(SALT_SIZE);
    let key = derive_key(password, salt);

    key[..].ct_eq(expected).into()
}
