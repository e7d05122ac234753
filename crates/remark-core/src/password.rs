//! Argon2id password hashing shared by every [`AuthService`](crate::AuthService).
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters, so a stored value can be verified without extra state.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Backend(format!("password hashing failed: {}", e)))
}

/// Check a password against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::Backend(format!("stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: &str) -> Result<String> {
    let password = password.to_string();
    blocking(move || hash_password(&password)).await
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: &str, stored: &str) -> Result<bool> {
    let password = password.to_string();
    let stored = stored.to_string();
    blocking(move || verify_password(&password, &stored)).await
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Backend(format!("password task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret.123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret.123", &hash).unwrap());
        assert!(!verify_password("secret.123", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(Error::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() {
        let hash = hash_password_blocking("Hunter2.secret").await.unwrap();
        assert!(verify_password_blocking("Hunter2.secret", &hash)
            .await
            .unwrap());
        assert!(!verify_password_blocking("hunter2.secret", &hash)
            .await
            .unwrap());
    }
}
