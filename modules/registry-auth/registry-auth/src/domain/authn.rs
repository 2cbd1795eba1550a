//! Authenticators built from the plugin seams.

use std::sync::Arc;

use async_trait::async_trait;
use registry_auth_sdk::{
    PasswordAuthenticator, RefreshTokenAuthenticator, RefreshTokenVerifier, RegistryAuthError,
    Subject, SubjectRepository,
};

/// Authenticates refresh tokens: the verifier extracts the subject id, the
/// repository resolves it to a live subject.
pub struct DefaultRefreshTokenAuthenticator {
    verifier: Arc<dyn RefreshTokenVerifier>,
    subject_repository: Arc<dyn SubjectRepository>,
}

impl DefaultRefreshTokenAuthenticator {
    #[must_use]
    pub fn new(
        verifier: Arc<dyn RefreshTokenVerifier>,
        subject_repository: Arc<dyn SubjectRepository>,
    ) -> Self {
        Self {
            verifier,
            subject_repository,
        }
    }
}

#[async_trait]
impl RefreshTokenAuthenticator for DefaultRefreshTokenAuthenticator {
    async fn authenticate_refresh_token(
        &self,
        service: &str,
        refresh_token: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
        let subject_id = self
            .verifier
            .verify_refresh_token(service, refresh_token)
            .await?;

        self.subject_repository.get_subject_by_id(&subject_id).await
    }
}

/// Combines a password and a refresh token authenticator.
#[derive(Clone)]
pub struct Authenticator {
    pub password: Arc<dyn PasswordAuthenticator>,
    pub refresh_token: Arc<dyn RefreshTokenAuthenticator>,
}

impl Authenticator {
    #[must_use]
    pub fn new(
        password: Arc<dyn PasswordAuthenticator>,
        refresh_token: Arc<dyn RefreshTokenAuthenticator>,
    ) -> Self {
        Self {
            password,
            refresh_token,
        }
    }
}

#[async_trait]
impl PasswordAuthenticator for Authenticator {
    async fn authenticate_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
        self.password.authenticate_password(username, password).await
    }
}

#[async_trait]
impl RefreshTokenAuthenticator for Authenticator {
    async fn authenticate_refresh_token(
        &self,
        service: &str,
        refresh_token: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
        self.refresh_token
            .authenticate_refresh_token(service, refresh_token)
            .await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashMap;

    use registry_auth_sdk::SubjectId;

    use super::*;

    #[derive(Debug)]
    struct SubjectStub(SubjectId);

    impl Subject for SubjectStub {
        fn id(&self) -> SubjectId {
            self.0.clone()
        }

        fn attribute(&self, _key: &str) -> Option<&str> {
            None
        }

        fn attributes(&self) -> HashMap<String, String> {
            HashMap::new()
        }
    }

    /// Accepts `valid` as the only token and maps it to `alice`.
    struct VerifierStub;

    #[async_trait]
    impl RefreshTokenVerifier for VerifierStub {
        async fn verify_refresh_token(
            &self,
            _service: &str,
            refresh_token: &str,
        ) -> Result<SubjectId, RegistryAuthError> {
            if refresh_token == "valid" {
                Ok(SubjectId::from("alice"))
            } else {
                Err(RegistryAuthError::AuthenticationFailed)
            }
        }
    }

    /// Knows `alice` only.
    struct RepositoryStub;

    #[async_trait]
    impl SubjectRepository for RepositoryStub {
        async fn get_subject_by_id(
            &self,
            id: &SubjectId,
        ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
            if id.as_str() == "alice" {
                Ok(Arc::new(SubjectStub(id.clone())))
            } else {
                Err(RegistryAuthError::AuthenticationFailed)
            }
        }
    }

    /// Every subject lookup fails with a backend error.
    struct BrokenRepository;

    #[async_trait]
    impl SubjectRepository for BrokenRepository {
        async fn get_subject_by_id(
            &self,
            _id: &SubjectId,
        ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
            Err(RegistryAuthError::Internal("store unavailable".to_owned()))
        }
    }

    #[tokio::test]
    async fn resolves_subject_of_valid_token() {
        let authenticator =
            DefaultRefreshTokenAuthenticator::new(Arc::new(VerifierStub), Arc::new(RepositoryStub));

        let subject = authenticator
            .authenticate_refresh_token("service", "valid")
            .await
            .unwrap();
        assert_eq!(subject.id(), SubjectId::from("alice"));
    }

    #[tokio::test]
    async fn verification_failure_propagates() {
        let authenticator =
            DefaultRefreshTokenAuthenticator::new(Arc::new(VerifierStub), Arc::new(RepositoryStub));

        let result = authenticator
            .authenticate_refresh_token("service", "forged")
            .await;
        assert!(matches!(
            result,
            Err(RegistryAuthError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn repository_failure_propagates() {
        let authenticator = DefaultRefreshTokenAuthenticator::new(
            Arc::new(VerifierStub),
            Arc::new(BrokenRepository),
        );

        let result = authenticator
            .authenticate_refresh_token("service", "valid")
            .await;
        assert!(matches!(result, Err(RegistryAuthError::Internal(_))));
    }

    #[tokio::test]
    async fn facade_delegates_refresh_tokens() {
        struct NoPasswords;

        #[async_trait]
        impl PasswordAuthenticator for NoPasswords {
            async fn authenticate_password(
                &self,
                _username: &str,
                _password: &str,
            ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
                Err(RegistryAuthError::AuthenticationFailed)
            }
        }

        let authenticator = Authenticator::new(
            Arc::new(NoPasswords),
            Arc::new(DefaultRefreshTokenAuthenticator::new(
                Arc::new(VerifierStub),
                Arc::new(RepositoryStub),
            )),
        );

        let subject = authenticator
            .authenticate_refresh_token("service", "valid")
            .await
            .unwrap();
        assert_eq!(subject.id(), SubjectId::from("alice"));

        let result = authenticator.authenticate_password("alice", "secret").await;
        assert!(matches!(
            result,
            Err(RegistryAuthError::AuthenticationFailed)
        ));
    }
}
