use registry_auth_sdk::RegistryAuthError;

/// Checks a password against a stored hash.
///
/// Implementations are CPU bound; callers run them on a blocking thread.
pub trait PasswordVerifier: Send + Sync {
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if `hash` cannot be processed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, RegistryAuthError>;
}

/// bcrypt [`PasswordVerifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> Result<bool, RegistryAuthError> {
        bcrypt::verify(password, hash).map_err(|e| RegistryAuthError::Internal(e.to_string()))
    }
}
