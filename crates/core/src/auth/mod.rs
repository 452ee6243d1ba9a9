//! User credentials: Argon2id hashing and the password policy.

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_password_policy, hash_password, verify_password,
};
