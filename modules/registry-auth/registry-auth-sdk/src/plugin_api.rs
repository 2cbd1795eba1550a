//! Policy seams the token service delegates to.
//!
//! Integrators replace these to plug in their own user stores and
//! authorization policies; the rest of the pipeline stays the same.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RegistryAuthError;
use crate::subject::{Subject, SubjectId};

/// Decides which actions a subject may perform on a repository.
#[async_trait]
pub trait RepositoryAuthorizer: Send + Sync {
    /// Return the granted subset of `actions` on repository `name`.
    ///
    /// An empty result denies access to the repository.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the subject is anonymous and anonymous access is disabled
    /// - any backend failure; the whole authorization call is aborted
    async fn authorize(
        &self,
        name: &str,
        subject: Option<&dyn Subject>,
        actions: &[String],
    ) -> Result<Vec<String>, RegistryAuthError>;
}

/// Looks up subjects by id.
///
/// Implementations return a consistent snapshot of the subject at call time.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the subject is unknown or disabled
    /// - any backend failure
    async fn get_subject_by_id(&self, id: &SubjectId)
    -> Result<Arc<dyn Subject>, RegistryAuthError>;
}

/// Verifies refresh tokens.
#[async_trait]
pub trait RefreshTokenVerifier: Send + Sync {
    /// Verify `refresh_token` for `service` and return the subject it was issued to.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` if the token is malformed, badly signed or
    ///   was issued for another audience or by another issuer
    async fn verify_refresh_token(
        &self,
        service: &str,
        refresh_token: &str,
    ) -> Result<SubjectId, RegistryAuthError>;
}
