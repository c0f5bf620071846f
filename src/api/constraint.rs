//! Search constraints for Data API queries.

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use crate::error::ConfigError;
use crate::model::Value;

/// A server-side filter predicate applied before pagination.
///
/// Constraints serialize to the wire form the Data API expects: a JSON
/// object with `key`, `constraint_type` and, except for the existence
/// checks, a `value`. A request carries them as a JSON-encoded array in the
/// `constraints` query parameter.
///
/// # Example
///
/// ```
/// use bubble_lib::Constraint;
///
/// let active = Constraint::equals("status", "active");
/// let named = Constraint::text_contains("name", "Corp");
/// let assigned = Constraint::is_not_empty("owner");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Exact match: `key equals value`.
    Equals(String, Value),
    /// Negated exact match.
    NotEqual(String, Value),
    /// Numeric/date comparison: `key > value`.
    GreaterThan(String, Value),
    /// Numeric/date comparison: `key < value`.
    LessThan(String, Value),
    /// Substring match on a text field.
    TextContains(String, String),
    /// Negated substring match.
    NotTextContains(String, String),
    /// List field contains the value.
    Contains(String, Value),
    /// List field does not contain the value.
    NotContains(String, Value),
    /// Field value is one of the listed values.
    InList(String, Vec<Value>),
    /// Field value is none of the listed values.
    NotInList(String, Vec<Value>),
    /// Field is empty/unset.
    IsEmpty(String),
    /// Field is present and non-empty.
    IsNotEmpty(String),
}

impl Constraint {
    /// Creates an exact-match constraint.
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::Equals(key.into(), value.into())
    }

    /// Creates a negated exact-match constraint.
    pub fn not_equal(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::NotEqual(key.into(), value.into())
    }

    /// Creates a greater-than constraint.
    pub fn greater_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::GreaterThan(key.into(), value.into())
    }

    /// Creates a less-than constraint.
    pub fn less_than(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::LessThan(key.into(), value.into())
    }

    /// Creates a text-contains constraint.
    pub fn text_contains(key: impl Into<String>, value: impl Into<String>) -> Self {
        Constraint::TextContains(key.into(), value.into())
    }

    /// Creates a negated text-contains constraint.
    pub fn not_text_contains(key: impl Into<String>, value: impl Into<String>) -> Self {
        Constraint::NotTextContains(key.into(), value.into())
    }

    /// Creates a list-contains constraint.
    pub fn contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::Contains(key.into(), value.into())
    }

    /// Creates a negated list-contains constraint.
    pub fn not_contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Constraint::NotContains(key.into(), value.into())
    }

    /// Creates an in-list constraint.
    pub fn in_list(key: impl Into<String>, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Constraint::InList(key.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates a not-in-list constraint.
    pub fn not_in_list(
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Constraint::NotInList(key.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates an is-empty constraint.
    pub fn is_empty(key: impl Into<String>) -> Self {
        Constraint::IsEmpty(key.into())
    }

    /// Creates an is-not-empty constraint.
    pub fn is_not_empty(key: impl Into<String>) -> Self {
        Constraint::IsNotEmpty(key.into())
    }

    /// Returns the field key this constraint applies to.
    pub fn key(&self) -> &str {
        match self {
            Constraint::Equals(key, _)
            | Constraint::NotEqual(key, _)
            | Constraint::GreaterThan(key, _)
            | Constraint::LessThan(key, _)
            | Constraint::TextContains(key, _)
            | Constraint::NotTextContains(key, _)
            | Constraint::Contains(key, _)
            | Constraint::NotContains(key, _)
            | Constraint::InList(key, _)
            | Constraint::NotInList(key, _)
            | Constraint::IsEmpty(key)
            | Constraint::IsNotEmpty(key) => key,
        }
    }

    /// Returns the wire name of the constraint operator.
    pub fn constraint_type(&self) -> &'static str {
        match self {
            Constraint::Equals(..) => "equals",
            Constraint::NotEqual(..) => "not equal",
            Constraint::GreaterThan(..) => "greater than",
            Constraint::LessThan(..) => "less than",
            Constraint::TextContains(..) => "text contains",
            Constraint::NotTextContains(..) => "not text contains",
            Constraint::Contains(..) => "contains",
            Constraint::NotContains(..) => "not contains",
            Constraint::InList(..) => "in",
            Constraint::NotInList(..) => "not in",
            Constraint::IsEmpty(..) => "is_empty",
            Constraint::IsNotEmpty(..) => "is_not_empty",
        }
    }

    fn value(&self) -> Option<Value> {
        match self {
            Constraint::Equals(_, v)
            | Constraint::NotEqual(_, v)
            | Constraint::GreaterThan(_, v)
            | Constraint::LessThan(_, v)
            | Constraint::Contains(_, v)
            | Constraint::NotContains(_, v) => Some(v.clone()),
            Constraint::TextContains(_, s) | Constraint::NotTextContains(_, s) => {
                Some(Value::String(s.clone()))
            }
            Constraint::InList(_, vs) | Constraint::NotInList(_, vs) => {
                Some(Value::List(vs.clone()))
            }
            Constraint::IsEmpty(_) | Constraint::IsNotEmpty(_) => None,
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self.value();
        let len = if value.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("key", self.key())?;
        map.serialize_entry("constraint_type", self.constraint_type())?;
        if let Some(value) = value {
            map.serialize_entry("value", &value)?;
        }
        map.end()
    }
}

/// Rejects mutually exclusive constraints on the same key.
///
/// Runs before any network call so a conflicting request fails fast.
pub(crate) fn validate_constraints(constraints: &[Constraint]) -> Result<(), ConfigError> {
    for constraint in constraints {
        if let Constraint::IsEmpty(key) = constraint {
            let conflict = constraints
                .iter()
                .any(|c| matches!(c, Constraint::IsNotEmpty(other) if other == key));
            if conflict {
                return Err(ConfigError::ConflictingConstraints { key: key.clone() });
            }
        }
    }
    Ok(())
}
