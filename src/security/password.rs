//! Password hashing and verification utilities.
//!
//! Operator blocks accept several credential formats, picked by shape:
//! - `$argon2...`: an Argon2 PHC string
//! - `$2...`: a bcrypt hash
//! - `<salt>$<hash>`: unpadded base64 salt and Argon2id digest (t=1, m=1024 KiB, p=4, 32 bytes)
//! - anything else: a plaintext password, for development configs

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

const LEGACY_T_COST: u32 = 1;
const LEGACY_M_COST: u32 = 1024;
const LEGACY_P_COST: u32 = 4;
const LEGACY_KEY_LEN: usize = 32;

/// Verify `password` against a stored credential of any supported format.
pub fn verify(password: &str, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        return PasswordHash::new(stored)
            .map(|hash| verify_password(password, &hash).unwrap_or(false))
            .unwrap_or(false);
    }
    if stored.starts_with("$2") {
        return bcrypt::verify(password, stored).unwrap_or(false);
    }
    if let Some((salt, digest)) = stored.split_once('$') {
        return verify_legacy(password, salt, digest);
    }
    bool::from(password.as_bytes().ct_eq(stored.as_bytes()))
}

/// Verify a password against a parsed Argon2 PHC hash.
pub fn verify_password(
    password: &str,
    hash: &PasswordHash<'_>,
) -> Result<bool, argon2::password_hash::Error> {
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), hash)
        .is_ok())
}

/// Hash a password using default Argon2 settings, producing a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_legacy(password: &str, salt_b64: &str, digest_b64: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (
        STANDARD_NO_PAD.decode(salt_b64),
        STANDARD_NO_PAD.decode(digest_b64),
    ) else {
        return false;
    };
    match legacy_digest(password, &salt) {
        Some(actual) => bool::from(actual.as_slice().ct_eq(expected.as_slice())),
        None => false,
    }
}

fn legacy_digest(password: &str, salt: &[u8]) -> Option<Vec<u8>> {
    let params = Params::new(
        LEGACY_M_COST,
        LEGACY_T_COST,
        LEGACY_P_COST,
        Some(LEGACY_KEY_LEN),
    )
    .ok()?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut out = vec![0u8; LEGACY_KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .ok()?;
    Some(out)
}
