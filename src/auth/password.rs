//! # Password Hashing
//!
//! PBKDF2-HMAC-SHA256 credentials in `salt:hash` hex form, matching the
//! production user table. Verification is constant-time over the derived
//! hash.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ITERATIONS: u32 = 310_000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash a password into the stored credential form.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut derived = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut derived);

    format!("{}:{}", hex::encode(salt), hex::encode(derived))
}

/// Verify a password against a stored credential. Malformed credentials
/// verify as false; they never panic or error.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once(':') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    if salt.is_empty() || expected.len() != KEY_LENGTH {
        return false;
    }

    let mut derived = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut derived);

    derived.ct_eq(expected.as_slice()).into()
}
