//! Structured cache identifiers.
//!
//! A [`QueryKey`] names one cached query result: a resource name plus the
//! parameters that distinguish this result from its siblings (project id,
//! page index, search string, and so on). Two keys are equal iff the
//! resource name and every parameter value are equal.
//!
//! Parameters are typed via [`ParamValue`], so `("page", 0)` and
//! `("page", "0")` are different keys rather than an accidental collision.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A typed query parameter value.
///
/// Keys compare structurally, so the value's type participates in
/// equality: an integer parameter never equals its textual rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// An integer parameter (ids, page indices, page sizes).
    Int(i64),
    /// A textual parameter (search strings, sort columns).
    Text(String),
    /// A boolean parameter (filter toggles).
    Flag(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(formatter, "{value}"),
            Self::Text(value) => write!(formatter, "{value}"),
            Self::Flag(value) => write!(formatter, "{value}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// A structured, comparable cache identifier.
///
/// Composed of a resource name and an ordered set of named parameters.
/// Keys are cheap to clone, hash, and order; parameter storage is a
/// `BTreeMap` so iteration order (and therefore `Ord`, `Hash`, and the
/// `Display` rendering) is deterministic.
///
/// # Examples
///
/// ```rust
/// use mutars::cache::QueryKey;
///
/// let key = QueryKey::new("budgets")
///     .with("project", 7)
///     .with("page", 0)
///     .with("search", "cement");
///
/// assert_eq!(key.resource(), "budgets");
/// assert_eq!(key.to_string(), "budgets?page=0&project=7&search=cement");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryKey {
    resource: Cow<'static, str>,
    params: BTreeMap<Cow<'static, str>, ParamValue>,
}

impl QueryKey {
    /// Creates a key for the given resource with no parameters.
    pub fn new(resource: impl Into<Cow<'static, str>>) -> Self {
        Self {
            resource: resource.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a named parameter, consuming and returning the key.
    #[must_use]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The resource name this key belongs to.
    ///
    /// Useful for prefix predicates passed to
    /// [`EntityCache::invalidate_where`](crate::cache::EntityCache::invalidate_where).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns `true` if this key names the given resource.
    #[must_use]
    pub fn is_for(&self, resource: &str) -> bool {
        self.resource == resource
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.resource)?;
        for (index, (name, value)) in self.params.iter().enumerate() {
            let separator = if index == 0 { '?' } else { '&' };
            write!(formatter, "{separator}{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keys_with_same_resource_and_params_are_equal() {
        let first = QueryKey::new("budgets").with("project", 7).with("page", 0);
        let second = QueryKey::new("budgets").with("page", 0).with("project", 7);
        assert_eq!(first, second);
    }

    #[rstest]
    fn keys_with_different_param_values_are_distinct() {
        let first = QueryKey::new("budgets").with("page", 0);
        let second = QueryKey::new("budgets").with("page", 1);
        assert_ne!(first, second);
    }

    #[rstest]
    fn keys_with_different_resources_are_distinct() {
        let first = QueryKey::new("budgets").with("project", 7);
        let second = QueryKey::new("materials").with("project", 7);
        assert_ne!(first, second);
    }

    #[rstest]
    fn typed_params_do_not_collide() {
        let numeric = QueryKey::new("tasks").with("page", 0);
        let textual = QueryKey::new("tasks").with("page", "0");
        assert_ne!(numeric, textual);
    }

    #[rstest]
    fn with_replaces_existing_param() {
        let key = QueryKey::new("tasks").with("page", 0).with("page", 3);
        assert_eq!(key.param("page"), Some(&ParamValue::Int(3)));
    }

    #[rstest]
    fn display_renders_resource_and_sorted_params() {
        let key = QueryKey::new("materials")
            .with("search", "rebar")
            .with("diary", 12);
        assert_eq!(key.to_string(), "materials?diary=12&search=rebar");
    }

    #[rstest]
    fn display_without_params_is_just_the_resource() {
        assert_eq!(QueryKey::new("projects").to_string(), "projects");
    }

    #[rstest]
    fn is_for_matches_resource_only() {
        let key = QueryKey::new("tasks").with("project", 1);
        assert!(key.is_for("tasks"));
        assert!(!key.is_for("budgets"));
    }
}
