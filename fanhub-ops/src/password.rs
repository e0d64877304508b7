use anyhow::{Context, Result};

/// Hash a password with bcrypt at the given work factor
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}
