use thiserror::Error;

/// Cheapest cost bcrypt accepts; used by tests
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("password longer than {MAX_PASSWORD_BYTES} bytes")]
    TooLong,
}

/// One-way salted bcrypt hash of `plain`.
///
/// Inputs past 72 bytes are rejected rather than silently truncated.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(bcrypt::hash(plain, cost)?)
}

/// Constant-time bcrypt check; a malformed `hash` counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}
