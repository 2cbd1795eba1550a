//! Password authenticator and subject repository over a static user list.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use registry_auth_sdk::{
    PasswordAuthenticator, RegistryAuthError, Subject, SubjectId, SubjectRepository,
};

use crate::config::StaticUsersPluginConfig;
use crate::domain::user::User;
use crate::domain::verifier::{BcryptVerifier, PasswordVerifier};

/// Hashed at construction and verified against for unknown or disabled
/// users, so every failed login costs one full hash verification.
const DUMMY_PASSWORD: &str = "registry-auth-dummy-password";

/// Authenticates users from a fixed list.
///
/// Usernames are subject ids. Disabled users fail both password
/// authentication and subject lookups.
pub struct UserAuthenticator {
    users: HashMap<String, Arc<User>>,
    dummy_hash: String,
    verifier: Arc<dyn PasswordVerifier>,
}

impl UserAuthenticator {
    /// Build an authenticator for `users`. A later entry replaces an
    /// earlier one with the same username.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a password hash is not a bcrypt hash.
    pub fn new(users: impl IntoIterator<Item = User>) -> Result<Self, RegistryAuthError> {
        let users: HashMap<String, Arc<User>> = users
            .into_iter()
            .map(|user| (user.username.clone(), Arc::new(user)))
            .collect();

        let mut cost = None;
        for user in users.values() {
            let parts: bcrypt::HashParts = user.password_hash.parse().map_err(|_| {
                RegistryAuthError::Config(format!(
                    "password hash of user \"{}\" is not a bcrypt hash",
                    user.username
                ))
            })?;
            cost = cost.max(Some(parts.get_cost()));
        }

        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost.unwrap_or(bcrypt::DEFAULT_COST))
            .map_err(|e| RegistryAuthError::Internal(e.to_string()))?;

        Ok(Self {
            users,
            dummy_hash,
            verifier: Arc::new(BcryptVerifier),
        })
    }

    /// Build an authenticator from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a password hash is not a bcrypt hash.
    pub fn from_config(config: &StaticUsersPluginConfig) -> Result<Self, RegistryAuthError> {
        Self::new(config.users.iter().cloned().map(User::from))
    }

    /// Replace the bcrypt verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn PasswordVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    fn enabled_user(&self, username: &str) -> Option<&Arc<User>> {
        self.users.get(username).filter(|user| user.enabled)
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, RegistryAuthError> {
        let verifier = Arc::clone(&self.verifier);
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || verifier.verify(&password, &hash))
            .await
            .map_err(|e| RegistryAuthError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl PasswordAuthenticator for UserAuthenticator {
    async fn authenticate_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
        let Some(user) = self.enabled_user(username) else {
            self.verify(password, &self.dummy_hash).await?;
            tracing::debug!(username, "unknown or disabled user");
            return Err(RegistryAuthError::AuthenticationFailed);
        };

        if self.verify(password, &user.password_hash).await? {
            Ok(Arc::clone(user) as Arc<dyn Subject>)
        } else {
            Err(RegistryAuthError::AuthenticationFailed)
        }
    }
}

#[async_trait]
impl SubjectRepository for UserAuthenticator {
    async fn get_subject_by_id(
        &self,
        id: &SubjectId,
    ) -> Result<Arc<dyn Subject>, RegistryAuthError> {
        self.enabled_user(id.as_str())
            .map(|user| Arc::clone(user) as Arc<dyn Subject>)
            .ok_or(RegistryAuthError::AuthenticationFailed)
    }
}
