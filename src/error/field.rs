//! Field access errors for Record getters

/// Error raised by the typed getters on [`Record`](crate::model::Record).
///
/// Type names in `TypeMismatch` come from
/// [`Value::type_name`](crate::model::Value::type_name): `null`, `bool`,
/// `int`, `float`, `string`, `datetime`, `list` or `json`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The record has no field with this name. Note that a field holding
    /// `Null` is present, not missing.
    #[error("record has no field '{field}'")]
    Missing {
        /// The requested field name.
        field: String,
    },

    /// The field holds a value of a different type than the getter asked for.
    #[error("field '{field}' holds {actual}, not {expected}")]
    TypeMismatch {
        /// The requested field name.
        field: String,
        /// The type the getter asked for.
        expected: &'static str,
        /// The type actually stored.
        actual: &'static str,
    },
}
