//! Password hashing with Argon2id and the rules new passwords must follow.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password accepted for a user.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during password operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Verification failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password shorter than the minimum.
    #[error("password must have at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password and confirmation differ.
    #[error("password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Checks a new password and its confirmation.
///
/// # Errors
///
/// Returns `TooShort` or `ConfirmationMismatch`.
pub fn check_password_policy(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if password != confirmation {
        return Err(PasswordError::ConfirmationMismatch);
    }
    Ok(())
}

/// Hashes a password into a PHC string.
///
/// ```
/// use webbudget_core::auth::hash_password;
///
/// let hash = hash_password("s3cret-budget").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a password against a stored hash; `Ok(false)` on mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("family-budget").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("family-budget", &hash).unwrap());
        assert!(!verify_password("family-budgets", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        assert_ne!(
            hash_password("family-budget").unwrap(),
            hash_password("family-budget").unwrap()
        );
    }

    #[test]
    fn test_invalid_hash() {
        assert_eq!(
            verify_password("whatever", "not-a-hash"),
            Err(PasswordError::InvalidHash)
        );
    }

    #[rstest]
    #[case("12345678", "12345678", Ok(()))]
    #[case("1234567", "1234567", Err(PasswordError::TooShort))]
    #[case("12345678", "12345679", Err(PasswordError::ConfirmationMismatch))]
    fn test_password_policy(
        #[case] password: &str,
        #[case] confirmation: &str,
        #[case] expected: Result<(), PasswordError>,
    ) {
        assert_eq!(check_password_policy(password, confirmation), expected);
    }
}
