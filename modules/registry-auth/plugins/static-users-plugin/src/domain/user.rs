use std::collections::HashMap;
use std::fmt;

use registry_auth_sdk::{Subject, SubjectId};

use crate::config::UserConfig;

/// A statically configured user.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
    pub attributes: HashMap<String, String>,
}

impl User {
    /// An enabled user without attributes.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            enabled: true,
            attributes: HashMap::new(),
        }
    }
}

impl From<UserConfig> for User {
    fn from(config: UserConfig) -> Self {
        Self {
            username: config.username,
            password_hash: config.password_hash,
            enabled: config.enabled,
            attributes: config.attributes,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl Subject for User {
    fn id(&self) -> SubjectId {
        SubjectId::from(self.username.as_str())
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn attributes(&self) -> HashMap<String, String> {
        self.attributes.clone()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use registry_auth_sdk::{SUBJECT_NAME, subject_name};

    use super::*;

    #[test]
    fn exposes_username_and_attributes() {
        let mut user = User::new("alice", "hash");
        user.attributes
            .insert(SUBJECT_NAME.to_owned(), "Alice".to_owned());

        assert_eq!(user.id(), SubjectId::from("alice"));
        assert_eq!(user.attribute(SUBJECT_NAME), Some("Alice"));
        assert_eq!(user.attribute("email"), None);
        assert_eq!(subject_name(&user), "Alice");

        let mut copy = user.attributes();
        copy.insert("email".to_owned(), "alice@example.com".to_owned());
        assert_eq!(user.attribute("email"), None);
    }

    #[test]
    fn debug_hides_password_hash() {
        let rendered = format!("{:?}", User::new("alice", "$2y$10$secret"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret"));
    }
}
