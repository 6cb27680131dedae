use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("password worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash password for secure storage.
///
/// bcrypt is CPU bound, so the work runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Verify password against stored hash.
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

/// Spends the same bcrypt work as a real check when there is no stored hash,
/// so a missing account costs as much time as a wrong password.
pub async fn burn_verify(password: String, cost: u32) -> Result<(), PasswordError> {
    hash_password(password, cost).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("hunter22".to_string(), 4).await.unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter23".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("x".to_string(), "not-a-hash".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn burn_verify_runs_the_hash() {
        assert!(burn_verify("hunter22".to_string(), 4).await.is_ok());
        assert!(burn_verify("hunter22".to_string(), 99).await.is_err());
    }
}
