//! Authenticated identity abstraction.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute key providing an alternate, human-readable name for a [`Subject`].
pub const SUBJECT_NAME: &str = "name";

/// Attribute key for an arbitrary classification of a [`Subject`].
///
/// For example: users may have their own personal namespace to push to,
/// machine users (service accounts) may not. The type can also serve as a
/// component of a composite key that uniquely identifies a subject.
pub const SUBJECT_TYPE: &str = "type";

/// Primary identifier of a [`Subject`] (a username or an arbitrary ID).
///
/// A `SubjectId` is not necessarily globally unique: authenticators can
/// federate between providers and subject types (eg. human and machine
/// users). Composing a globally unique key (adding the subject type and/or
/// provider) is left to the caller.
///
/// The id appears in the `sub` claim of issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Information about an authenticated subject.
///
/// Subjects are built by an authenticator, are immutable, and live for the
/// duration of a single request. Implementations may carry extra behavior
/// for custom authorizers; making sure every configured authenticator
/// produces compatible subjects is up to the integrator.
pub trait Subject: fmt::Debug + Send + Sync {
    /// Identifier of the subject.
    fn id(&self) -> SubjectId;

    /// A single attribute value, if present.
    fn attribute(&self, key: &str) -> Option<&str>;

    /// A copy of all attributes.
    ///
    /// This may be relatively expensive; prefer [`Subject::attribute`].
    fn attributes(&self) -> HashMap<String, String>;
}

/// Human-readable name of a subject.
///
/// Returns the [`SUBJECT_NAME`] attribute if it is present and non-empty,
/// the subject id otherwise.
#[must_use]
pub fn subject_name(subject: &dyn Subject) -> String {
    match subject.attribute(SUBJECT_NAME) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => subject.id().into_inner(),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct SubjectStub {
        id: &'static str,
        attrs: HashMap<String, String>,
    }

    impl Subject for SubjectStub {
        fn id(&self) -> SubjectId {
            SubjectId::from(self.id)
        }

        fn attribute(&self, key: &str) -> Option<&str> {
            self.attrs.get(key).map(String::as_str)
        }

        fn attributes(&self) -> HashMap<String, String> {
            self.attrs.clone()
        }
    }

    #[test]
    fn subject_name_falls_back_to_id() {
        let subject = SubjectStub {
            id: "id",
            attrs: HashMap::new(),
        };
        assert_eq!(subject_name(&subject), "id");
    }

    #[test]
    fn subject_name_ignores_empty_name_attribute() {
        let subject = SubjectStub {
            id: "id",
            attrs: HashMap::from([(SUBJECT_NAME.to_owned(), String::new())]),
        };
        assert_eq!(subject_name(&subject), "id");
    }

    #[test]
    fn subject_name_prefers_name_attribute() {
        let subject = SubjectStub {
            id: "id",
            attrs: HashMap::from([(SUBJECT_NAME.to_owned(), "Jane Doe".to_owned())]),
        };
        assert_eq!(subject_name(&subject), "Jane Doe");
    }

    #[test]
    fn subject_id_compares_by_value() {
        assert_eq!(SubjectId::from("alice"), SubjectId::new("alice".to_owned()));
        assert_ne!(SubjectId::from("alice"), SubjectId::from("bob"));
        assert_eq!(SubjectId::from("alice").to_string(), "alice");
    }
}
