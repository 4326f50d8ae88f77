//! Share password hashing.
//!
//! Share passwords are stored as Argon2id PHC strings.

#[cfg(test)]
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;

use crate::{DriveError, Result};

/// Minimum share password length.
pub const MIN_SHARE_PASSWORD_LENGTH: usize = 4;

/// Maximum share password length.
pub const MAX_SHARE_PASSWORD_LENGTH: usize = 128;

/// Argon2id with 19 MiB memory, 2 iterations, 1 lane.
fn create_argon2() -> Result<Argon2<'static>> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|e| DriveError::Validation(format!("invalid hashing parameters: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Check share password length.
pub fn validate_share_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_SHARE_PASSWORD_LENGTH {
        return Err(DriveError::Validation(format!(
            "share password must be at least {MIN_SHARE_PASSWORD_LENGTH} characters"
        )));
    }
    if len > MAX_SHARE_PASSWORD_LENGTH {
        return Err(DriveError::Validation(format!(
            "share password must be at most {MAX_SHARE_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a share password.
pub fn hash_share_password(password: &str) -> Result<String> {
    validate_share_password(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DriveError::Backend(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Whether `password` matches a stored share password hash.
#[cfg(test)]
pub(crate) fn verify_share_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    // Parameters come from the parsed hash.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
