use anyhow::{Context, Result};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: u64 = 6;

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
