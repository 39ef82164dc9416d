use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use keyward_core::{KeywardError, KeywardResult};

/// Hash a password using Argon2id with a random salt.
///
/// The work factor comes from `Argon2::default()`; swapping in a tuned
/// instance changes the cost for new hashes without invalidating old ones,
/// since the parameters travel inside the PHC string.
pub fn hash_password(password: &str) -> KeywardResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id by default
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| KeywardError::Crypto(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash string.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` otherwise.
pub fn verify_password(password: &str, hash: &str) -> KeywardResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| KeywardError::Crypto(format!("invalid credential hash: {e}")))?;
    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(KeywardError::Crypto(format!(
            "password verification failed: {e}"
        ))),
    }
}
