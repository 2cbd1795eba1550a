//! Authorization pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use registry_auth_sdk::{Authorizer, RegistryAuthError, RepositoryAuthorizer, Scope, Subject};

const RESOURCE_REPOSITORY: &str = "repository";
const RESOURCE_REGISTRY: &str = "registry";
const REGISTRY_CATALOG: &str = "catalog";

/// Basic authorization rules with repository decisions delegated to a
/// [`RepositoryAuthorizer`].
///
/// - `repository` scopes get the actions granted by the delegate; scopes
///   with no granted action are dropped
/// - `registry:catalog` is passed through unchanged
/// - everything else is denied
pub struct DefaultAuthorizer {
    repo_authorizer: Arc<dyn RepositoryAuthorizer>,
    allow_anonymous: bool,
}

impl DefaultAuthorizer {
    #[must_use]
    pub fn new(repo_authorizer: Arc<dyn RepositoryAuthorizer>, allow_anonymous: bool) -> Self {
        Self {
            repo_authorizer,
            allow_anonymous,
        }
    }
}

#[async_trait]
impl Authorizer for DefaultAuthorizer {
    async fn authorize(
        &self,
        subject: Option<&dyn Subject>,
        scopes: &[Scope],
    ) -> Result<Vec<Scope>, RegistryAuthError> {
        if subject.is_none() && !self.allow_anonymous {
            return Err(RegistryAuthError::Unauthorized);
        }

        let mut granted = Vec::with_capacity(scopes.len());

        for scope in scopes {
            match scope.resource_type() {
                RESOURCE_REPOSITORY => {
                    let actions = self
                        .repo_authorizer
                        .authorize(scope.name(), subject, &scope.actions)
                        .await?;

                    if actions.is_empty() {
                        tracing::debug!(scope = %scope, "No action granted on repository");
                        continue;
                    }

                    granted.push(Scope {
                        resource: scope.resource.clone(),
                        actions,
                    });
                }
                RESOURCE_REGISTRY if scope.name() == REGISTRY_CATALOG => {
                    granted.push(scope.clone());
                }
                RESOURCE_REGISTRY => {
                    tracing::debug!(scope = %scope, "Unknown registry resource");
                }
                _ => {
                    tracing::debug!(scope = %scope, "Unsupported resource type");
                }
            }
        }

        Ok(granted)
    }
}

/// Personal namespace policy: a subject gets every requested action on
/// repositories under `<subject id>/` and nothing elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRepositoryAuthorizer {
    allow_anonymous: bool,
}

impl DefaultRepositoryAuthorizer {
    #[must_use]
    pub fn new(allow_anonymous: bool) -> Self {
        Self { allow_anonymous }
    }
}

#[async_trait]
impl RepositoryAuthorizer for DefaultRepositoryAuthorizer {
    async fn authorize(
        &self,
        name: &str,
        subject: Option<&dyn Subject>,
        actions: &[String],
    ) -> Result<Vec<String>, RegistryAuthError> {
        let Some(subject) = subject else {
            if self.allow_anonymous {
                return Ok(Vec::new());
            }
            return Err(RegistryAuthError::Unauthorized);
        };

        let namespace = format!("{}/", subject.id());
        if !name.starts_with(&namespace) {
            return Ok(Vec::new());
        }

        Ok(actions.to_vec())
    }
}
