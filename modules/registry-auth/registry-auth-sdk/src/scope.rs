//! Token scope grammar.
//!
//! A scope describes an access request to a specific resource:
//!
//! ```text
//! resourceType[(resourceClass)]:resourceName:action[,action...]
//! ```
//!
//! The parenthesized resource class is deprecated and only accepted so that
//! legacy clients keep working. It is preserved on the parsed value and in
//! the rendered string, but it does not take part in comparisons.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryAuthError;

#[allow(clippy::expect_used)] // static pattern
static RESOURCE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]+)(?:\(([a-z0-9]+)\))?$").expect("resource type pattern is valid")
});

/// A resource identified by type and name (eg. `repository` / `library/alpine`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Deprecated resource class qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    pub name: String,
}

impl Resource {
    #[must_use]
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            class: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Ord for Resource {
    fn cmp(&self, other: &Self) -> Ordering {
        self.resource_type
            .cmp(&other.resource_type)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Resource {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Resource {}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}({class}):{}", self.resource_type, self.name),
            None => write!(f, "{}:{}", self.resource_type, self.name),
        }
    }
}

/// An access request: a [`Resource`] and the actions requested on it.
///
/// Actions keep their input order (duplicates included). Comparison treats
/// them as a set: both sides are cloned and sorted first, so comparing is
/// not a cheap operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    #[serde(flatten)]
    pub resource: Resource,
    pub actions: Vec<String>,
}

impl Scope {
    #[must_use]
    pub fn new<I, A>(resource: Resource, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            resource,
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource.resource_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    fn sorted_actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.actions.iter().map(String::as_str).collect();
        actions.sort_unstable();
        actions
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.resource
            .cmp(&other.resource)
            .then_with(|| self.sorted_actions().cmp(&other.sorted_actions()))
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scope {}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.actions.join(","))
    }
}

impl FromStr for Scope {
    type Err = RegistryAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scope(s)
    }
}

/// An ordered list of [`Scope`] values.
///
/// Ordering and equality are element-wise: element `i` of one list is
/// compared to element `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scopes(Vec<Scope>);

impl Scopes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope) {
        self.0.push(scope);
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Scope> {
        self.0
    }
}

impl Deref for Scopes {
    type Target = [Scope];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Scope>> for Scopes {
    fn from(scopes: Vec<Scope>) -> Self {
        Self(scopes)
    }
}

impl FromIterator<Scope> for Scopes {
    fn from_iter<T: IntoIterator<Item = Scope>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Scopes {
    type Item = Scope;
    type IntoIter = std::vec::IntoIter<Scope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Scopes {
    type Item = &'a Scope;
    type IntoIter = std::slice::Iter<'a, Scope>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{scope}")?;
        }
        Ok(())
    }
}

/// Parse a scope string into a [`Scope`].
///
/// The input is split on the first two colons only, so everything after the
/// second colon belongs to the action list. Actions are split on `,` and
/// trimmed; duplicates are kept as-is.
///
/// # Errors
///
/// Returns [`RegistryAuthError::InvalidScope`] if the string does not have
/// three colon-separated parts, the action list is empty, or the resource
/// type is malformed.
pub fn parse_scope(scope: &str) -> Result<Scope, RegistryAuthError> {
    let invalid = || RegistryAuthError::InvalidScope(scope.to_owned());

    let mut parts = scope.splitn(3, ':');
    let (Some(resource_type), Some(resource_name), Some(actions)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    if actions.is_empty() {
        return Err(invalid());
    }

    let (resource_type, class) = split_resource_class(resource_type).ok_or_else(invalid)?;

    Ok(Scope {
        resource: Resource {
            resource_type: resource_type.to_owned(),
            class: class.map(str::to_owned),
            name: resource_name.to_owned(),
        },
        actions: actions.split(',').map(|a| a.trim().to_owned()).collect(),
    })
}

/// Parse every scope in the list.
///
/// # Errors
///
/// Fails on the first invalid scope; no partial result is returned.
pub fn parse_scopes<I, S>(scopes: I) -> Result<Scopes, RegistryAuthError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    scopes
        .into_iter()
        .map(|s| parse_scope(s.as_ref()))
        .collect::<Result<Vec<_>, _>>()
        .map(Scopes)
}

fn split_resource_class(resource_type: &str) -> Option<(&str, Option<&str>)> {
    let captures = RESOURCE_TYPE_RE.captures(resource_type)?;
    let name = captures.get(1)?.as_str();
    let class = captures.get(2).map(|m| m.as_str());
    Some((name, class))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn repo(name: &str, actions: &[&str]) -> Scope {
        Scope::new(Resource::new("repository", name), actions.iter().copied())
    }

    #[test]
    fn parses_basic_scope() {
        let scope = parse_scope("repository:path/to/repo:pull,push").unwrap();

        assert_eq!(scope.resource_type(), "repository");
        assert_eq!(scope.name(), "path/to/repo");
        assert_eq!(scope.resource.class, None);
        assert_eq!(scope.actions, vec!["pull", "push"]);
    }

    #[test]
    fn trims_whitespace_around_actions() {
        let scope = parse_scope("repository:path/to/repo: pull , push ").unwrap();
        assert_eq!(scope.actions, vec!["pull", "push"]);
    }

    #[test]
    fn parses_resource_class() {
        let scope = parse_scope("repository(plugin):path/to/repo:pull").unwrap();

        assert_eq!(scope.resource_type(), "repository");
        assert_eq!(scope.resource.class.as_deref(), Some("plugin"));
        assert_eq!(scope.to_string(), "repository(plugin):path/to/repo:pull");
    }

    #[test]
    fn keeps_duplicate_actions() {
        let scope = parse_scope("repository:path/to/repo:pull,push,pull").unwrap();
        assert_eq!(scope.actions, vec!["pull", "push", "pull"]);
    }

    #[test]
    fn allows_empty_resource_name() {
        let scope = parse_scope("repository::pull").unwrap();
        assert_eq!(scope.name(), "");
    }

    #[test]
    fn name_is_split_off_before_actions() {
        // Everything after the second colon is the action list
        let scope = parse_scope("repository:host:5000/repo:pull").unwrap();
        assert_eq!(scope.name(), "host");
        assert_eq!(scope.actions, vec!["5000/repo:pull"]);
    }

    #[test]
    fn rejects_malformed_scopes() {
        for input in [
            "repository : path/to/repo : pull , push ",
            "repository:path/to/repo",
            "repository:path/to/repo:",
            ":path/to/repo:pull",
            "Repository:path/to/repo:pull",
            "repository(:path/to/repo:pull",
            "repository():path/to/repo:pull",
            "",
        ] {
            let err = parse_scope(input).unwrap_err();
            assert!(
                matches!(err, RegistryAuthError::InvalidScope(ref s) if s == input),
                "expected InvalidScope for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn display_keeps_original_action_order() {
        let scope = repo("path/to/repo", &["push", "pull"]);
        assert_eq!(scope, repo("path/to/repo", &["pull", "push"]));

        assert_eq!(scope.to_string(), "repository:path/to/repo:push,pull");
        assert_eq!(scope.actions, vec!["push", "pull"]);
    }

    #[test]
    fn scopes_differing_in_action_order_are_equal() {
        let a = repo("path/to/repo", &["pull", "push"]);
        let b = repo("path/to/repo", &["push", "pull"]);

        assert_eq!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a, b);
    }

    #[test]
    fn scope_ordering_uses_resource_then_actions() {
        assert!(repo("a", &["push"]) < repo("b", &["pull"]));
        assert!(repo("a", &["pull"]) < repo("a", &["push"]));
        assert!(repo("a", &["pull"]) < repo("a", &["pull", "push"]));
    }

    #[test]
    fn resource_ordering_uses_type_before_name() {
        let a = Resource::new("a", "z");
        let b = Resource::new("b", "a");

        assert!(a < b);
        assert!(Resource::new("a", "a") < Resource::new("a", "b"));
        assert_eq!(Resource::new("a", "x"), Resource::new("a", "x"));
    }

    #[test]
    fn resource_class_does_not_affect_equality() {
        let plain = Resource::new("repository", "app");
        let classed = Resource::new("repository", "app").with_class("image");
        assert_eq!(plain, classed);
    }

    #[test]
    fn scopes_compare_element_wise() {
        let left: Scopes = vec![repo("a", &["pull"]), repo("b", &["push", "pull"])].into();
        let right: Scopes = vec![repo("a", &["pull"]), repo("b", &["pull", "push"])].into();
        let swapped: Scopes = vec![repo("b", &["pull", "push"]), repo("a", &["pull"])].into();

        assert_eq!(left, right);
        assert_ne!(left, swapped);
        assert!(left < swapped);
    }

    #[test]
    fn scopes_render_space_joined() {
        let scopes: Scopes = vec![
            repo("a", &["pull"]),
            Scope::new(Resource::new("registry", "catalog"), ["*"]),
        ]
        .into();

        assert_eq!(scopes.to_string(), "repository:a:pull registry:catalog:*");
        assert_eq!(Scopes::new().to_string(), "");
    }

    #[test]
    fn parse_scopes_is_all_or_nothing() {
        let parsed = parse_scopes(["repository:a:pull", "registry:catalog:*"]).unwrap();
        assert_eq!(parsed.len(), 2);

        let err = parse_scopes(["repository:a:pull", "broken"]).unwrap_err();
        assert!(matches!(err, RegistryAuthError::InvalidScope(ref s) if s == "broken"));

        let empty = parse_scopes(Vec::<String>::new()).unwrap();
        assert!(empty.is_empty());
    }
}
