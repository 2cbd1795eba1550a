//! Token identifier (`jti`) generation.

use registry_auth_sdk::RegistryAuthError;
use uuid::Uuid;

/// Generates unique token identifiers.
pub trait IdGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RegistryAuthError::Internal`] if no identifier can be generated.
    fn generate_id(&self) -> Result<String, RegistryAuthError>;
}

/// Random (v4) UUID generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate_id(&self) -> Result<String, RegistryAuthError> {
        Ok(Uuid::new_v4().to_string())
    }
}
