//! Argon2 credential hashing.
//!
//! Hashing is CPU-bound, so request handlers go through the async wrappers,
//! which run the work on tokio's blocking pool.

use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash error");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash task panicked")?
}

pub async fn verify(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("verify task panicked")?
}
