//! Password hashing on the blocking pool.
//!
//! bcrypt is CPU-bound, so both hashing and verification run under
//! `spawn_blocking` and the request handler suspends until the result is
//! ready.

use anyhow::{Context, Result};

/// Hash a plaintext password with the given bcrypt cost factor.
///
/// # Errors
/// Returns an error if hashing fails or the blocking task is cancelled.
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed or the blocking task is
/// cancelled.
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("password verification task failed")?
        .context("failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast; production uses the configured cost.
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_is_never_the_plaintext() -> Result<()> {
        let hash = hash_password("pw1".to_string(), TEST_COST).await?;
        assert_ne!(hash, "pw1");
        assert!(hash.starts_with("$2"));
        Ok(())
    }

    #[tokio::test]
    async fn verify_accepts_matching_password() -> Result<()> {
        let hash = hash_password("pw1".to_string(), TEST_COST).await?;
        assert!(verify_password("pw1".to_string(), hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() -> Result<()> {
        let hash = hash_password("pw1".to_string(), TEST_COST).await?;
        assert!(!verify_password("pw2".to_string(), hash).await?);
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_malformed_hash() {
        let result = verify_password("pw1".to_string(), "not-a-hash".to_string()).await;
        assert!(result.is_err());
    }
}
